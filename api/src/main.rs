use actix_web::{web, HttpServer};
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

use otp_api::{create_app, telemetry::init_telemetry, AppState};
use otp_core::services::{Clock, OsRngOtpGenerator, OtpService, OtpServiceConfig, SystemClock};
use otp_infra::database::{DatabasePool, MySqlIdentityRepository, MySqlOtpLedgerRepository};
use otp_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    init_telemetry(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        bind_address = %config.server.bind_address(),
        "Starting OTP ledger API server"
    );

    // Database
    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to create database pool")?;

    if config.database.run_migrations {
        database.run_migrations().await.context("failed to run migrations")?;
    }

    if !database.health_check().await.context("database health check failed")? {
        tracing::warn!("Database health check reported an unexpected result");
    }
    tracing::info!(stats = %database.get_statistics(), "Database ready");

    // Repositories and services
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let identity_repository = Arc::new(MySqlIdentityRepository::new(
        database.get_pool().clone(),
        tracing::info_span!("identity_repository"),
    ));
    let ledger_repository = Arc::new(MySqlOtpLedgerRepository::with_ttl(
        database.get_pool().clone(),
        clock,
        Duration::minutes(config.otp.ttl_minutes),
        tracing::info_span!("otp_ledger"),
    ));

    let otp_service = Arc::new(OtpService::new(
        identity_repository,
        ledger_repository,
        Arc::new(OsRngOtpGenerator),
        OtpServiceConfig::from(&config.otp),
        tracing::info_span!("otp_service"),
    ));

    let app_state = web::Data::new(AppState::new(otp_service, &config.server));

    // HTTP server
    let mut server = HttpServer::new(move || create_app(app_state.clone()))
        .shutdown_timeout(config.server.shutdown_timeout);
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(config.server.bind_address())
        .with_context(|| format!("failed to bind {}", config.server.bind_address()))?
        .run()
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    database.close().await;

    Ok(())
}
