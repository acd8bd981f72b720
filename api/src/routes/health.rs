//! Liveness and health endpoints

use actix_web::HttpResponse;
use chrono::Utc;

use otp_shared::types::{HealthResponse, HealthStatus};

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "otp-ledger-api";

/// Handler for GET /ping
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json("pong")
}

/// Handler for GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: HealthStatus::Healthy,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
