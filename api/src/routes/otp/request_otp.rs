use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::repositories::{IdentityRepository, OtpLedgerRepository};
use otp_core::services::OtpGenerator;

use crate::app::AppState;
use crate::dto::{RequestOtpRequest, RequestOtpResponse};
use crate::handlers::{handle_domain_error, validation_error};
use crate::middleware::RequestId;

use super::with_deadline;

/// Handler for POST /otp/request
///
/// Issues a passcode for the user. The request's correlation id is recorded
/// with the passcode.
///
/// # Request Body
///
/// ```json
/// { "user_id": "3f0c1b8e-8a57-4a53-9d43-0c3f7e1d2a6b" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "user_id": "3f0c1b8e-8a57-4a53-9d43-0c3f7e1d2a6b", "otp": "04817" }
/// ```
///
/// ## Errors
/// - 400 `bad_request`: malformed body or user id
/// - 404 `identity_not_found`: unknown user
/// - 409 `otp_already_active`: a live passcode already exists
/// - 503 `otp_generation_failed`: retry later
/// - 500 `internal_error`
pub async fn request_otp<I, L, G>(
    state: web::Data<AppState<I, L, G>>,
    request_id: RequestId,
    request: web::Json<RequestOtpRequest>,
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
        user_id = %request.user_id,
        "Processing OTP request"
    );

    let outcome = with_deadline(
        state.request_timeout,
        state
            .otp_service
            .generate_otp(&request.user_id, request_id.as_str()),
    )
    .await;

    match outcome {
        Ok(otp) => HttpResponse::Ok().json(RequestOtpResponse {
            user_id: request.user_id,
            otp,
        }),
        Err(error) => handle_domain_error(error, request_id.as_str()),
    }
}
