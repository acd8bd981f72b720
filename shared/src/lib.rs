//! Shared utilities and common types for the OTP ledger server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and the layered configuration loader
//! - API response structures shared by the HTTP layer

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DatabaseConfig, Environment, LogFormat, LoggingConfig, OtpConfig,
    ServerConfig,
};
pub use types::{ErrorResponse, HealthResponse, HealthStatus};
