//! Application state and factory
//!
//! This module holds the shared application state and provides the factory
//! for creating the Actix-web application.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    web, App, Error, HttpMessage, HttpRequest, HttpResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

use otp_core::repositories::{IdentityRepository, OtpLedgerRepository};
use otp_core::services::{OtpGenerator, OtpService};
use otp_shared::config::ServerConfig;

use crate::dto::{ErrorResponse, ErrorResponseExt};
use crate::middleware::{RequestId, RequestIdMiddleware, REQUEST_ID_HEADER};
use crate::routes::{
    health::{health_check, ping},
    otp::{request_otp::request_otp, validate_otp::validate_otp},
};

/// Application state that holds shared services
pub struct AppState<I, L, G>
where
    I: IdentityRepository,
    L: OtpLedgerRepository,
    G: OtpGenerator,
{
    pub otp_service: Arc<OtpService<I, L, G>>,
    /// Deadline applied to every OTP service call
    pub request_timeout: Duration,
    /// Largest accepted JSON body in bytes
    pub max_payload_size: usize,
}

impl<I, L, G> AppState<I, L, G>
where
    I: IdentityRepository,
    L: OtpLedgerRepository,
    G: OtpGenerator,
{
    pub fn new(otp_service: Arc<OtpService<I, L, G>>, server: &ServerConfig) -> Self {
        Self {
            otp_service,
            request_timeout: Duration::from_secs(server.request_timeout),
            max_payload_size: server.max_payload_size,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<I, L, G>(
    app_state: web::Data<AppState<I, L, G>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    I: IdentityRepository + 'static,
    L: OtpLedgerRepository + 'static,
    G: OtpGenerator + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(app_state.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        // Add application state
        .app_data(app_state)
        .app_data(json_config)
        // Middleware (last wrapped runs first: the request id exists before logging)
        .wrap(TracingLogger::default())
        .wrap(RequestIdMiddleware)
        // Liveness and health
        .route("/ping", web::get().to(ping))
        .route("/health", web::get().to(health_check))
        // OTP routes
        .service(
            web::scope("/otp")
                .route("/request", web::post().to(request_otp::<I, L, G>))
                .route("/validate", web::post().to(validate_otp::<I, L, G>)),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Malformed or oversized JSON bodies become `400 bad_request`
fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .or_else(|| {
            req.headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });

    tracing::debug!(error = %err, request_id = ?request_id, "Rejected request body");

    let mut body = ErrorResponse::new("bad_request", format!("Invalid request body: {}", err));
    if let Some(request_id) = request_id {
        body = body.with_request_id(request_id);
    }

    InternalError::from_response(err, body.to_response(StatusCode::BAD_REQUEST)).into()
}

async fn not_found(request_id: RequestId) -> HttpResponse {
    ErrorResponse::new("not_found", "The requested resource was not found")
        .with_request_id(request_id.as_str())
        .to_response(StatusCode::NOT_FOUND)
}
