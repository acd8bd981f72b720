//! Mapping of domain errors onto HTTP responses

use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use otp_core::errors::{DomainError, OtpError};

use crate::dto::{ErrorResponse, ErrorResponseExt};

/// Status, error code and client message for a domain error
///
/// Store failures never expose their details.
pub fn error_parts(error: &DomainError) -> (StatusCode, &'static str, String) {
    match error {
        DomainError::IdentityNotFound => (
            StatusCode::NOT_FOUND,
            "identity_not_found",
            "User not found".to_string(),
        ),
        DomainError::Otp(otp_error) => {
            let status = match otp_error {
                OtpError::AlreadyActive => StatusCode::CONFLICT,
                OtpError::Invalid | OtpError::Expired => StatusCode::BAD_REQUEST,
            };
            (status, otp_error.code(), otp_error.to_string())
        }
        DomainError::Generation { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "otp_generation_failed",
            "Could not generate an OTP, please retry".to_string(),
        ),
        DomainError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "bad_request", message.clone())
        }
        DomainError::Store { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An internal error occurred".to_string(),
        ),
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError, request_id: &str) -> HttpResponse {
    let (status, code, message) = error_parts(&error);

    if status.is_server_error() {
        tracing::error!(request_id = request_id, error = %error, code, "Request failed");
    } else {
        tracing::debug!(request_id = request_id, error = %error, code, "Request rejected");
    }

    ErrorResponse::new(code, message)
        .with_request_id(request_id)
        .to_response(status)
}

/// Collapse validator output into a single `Validation` error
pub fn validation_error(errors: &ValidationErrors) -> DomainError {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();

    DomainError::Validation {
        message: format!("Invalid request fields: {}", fields.join(", ")),
    }
}
