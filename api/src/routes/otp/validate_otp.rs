use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::repositories::{IdentityRepository, OtpLedgerRepository};
use otp_core::services::OtpGenerator;

use crate::app::AppState;
use crate::dto::{ValidateOtpRequest, ValidateOtpResponse};
use crate::handlers::{handle_domain_error, validation_error};
use crate::middleware::RequestId;

use super::with_deadline;

/// Handler for POST /otp/validate
///
/// Consumes the user's passcode. The body's `request_id` is only used to
/// correlate logs.
///
/// # Request Body
///
/// ```json
/// {
///     "user_id": "3f0c1b8e-8a57-4a53-9d43-0c3f7e1d2a6b",
///     "otp": "04817",
///     "request_id": "c1d7..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "user_id": "3f0c1b8e-8a57-4a53-9d43-0c3f7e1d2a6b", "message": "OTP validated successfully." }
/// ```
///
/// ## Errors
/// - 400 `bad_request`, `invalid_otp` or `otp_expired`
/// - 404 `identity_not_found`
/// - 500 `internal_error`
pub async fn validate_otp<I, L, G>(
    state: web::Data<AppState<I, L, G>>,
    request_id: RequestId,
    request: web::Json<ValidateOtpRequest>,
) -> HttpResponse
where
    I: IdentityRepository + 'static,
    L: OtpLedgerRepository + 'static,
    G: OtpGenerator + 'static,
{
    let request = request.into_inner();

    if let Err(errors) = request.validate() {
        return handle_domain_error(validation_error(&errors), request_id.as_str());
    }

    tracing::info!(
        request_id = %request_id,
        client_request_id = %request.request_id,
        user_id = %request.user_id,
        "Processing OTP validation"
    );

    let outcome = with_deadline(
        state.request_timeout,
        state
            .otp_service
            .validate_otp(&request.user_id, &request.otp, &request.request_id),
    )
    .await;

    match outcome {
        Ok(()) => HttpResponse::Ok().json(ValidateOtpResponse::success(request.user_id)),
        Err(error) => handle_domain_error(error, request_id.as_str()),
    }
}
