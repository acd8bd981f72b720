//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Passcode length and validity window
//! - `server` - HTTP server binding, deadlines and shutdown
//!
//! Values are layered: built-in defaults, then an optional `config.{toml,json}`
//! file, then `OTP__SECTION__KEY` environment variables.

pub mod database;
pub mod environment;
pub mod otp;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use server::ServerConfig;

/// Default configuration file base name (extension resolved by the loader)
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "OTP";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Empty value for config key: {key}")]
    MissingValue { key: String },

    #[error("Invalid value for config key: {key} ({reason})")]
    InvalidValue { key: String, reason: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Passcode configuration
    pub otp: OtpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config.{toml,json}` in the working directory
    /// and `OTP__*` environment variables, then validate it.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration using `file` as the optional file source.
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        Self::load_with(file, env_overrides())
    }

    fn load_with(file: &str, overrides: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(overrides)
            .build()?;

        let has_logging = settings.get_table("logging").is_ok();
        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Logging defaults follow the environment unless explicitly configured
        if !has_logging {
            app_config.logging = LoggingConfig::for_environment(app_config.environment);
        }

        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject empty required keys and out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("server.host", self.server.host.as_str()),
            ("database.url", self.database.url.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingValue { key: key.to_string() });
            }
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must be non-zero"));
        }
        if self.server.request_timeout == 0 {
            return Err(invalid("server.request_timeout", "must be at least one second"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be greater than zero"));
        }
        self.otp.validate()?;

        Ok(())
    }
}

/// `OTP__SECTION__KEY` variables, e.g. `OTP__SERVER__PORT=8081`
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

pub(crate) fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.otp.code_length, 5);
        assert_eq!(config.otp.ttl_minutes, 5);
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let mut config = AppConfig::default();
        config.database.url = "  ".to_string();

        match config.validate() {
            Err(ConfigError::MissingValue { key }) => assert_eq!(key, "database.url"),
            other => panic!("Expected missing value error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_env_overrides_and_environment_logging() {
        let vars: config::Map<String, String> = [
            ("OTP__SERVER__PORT", "9191"),
            ("OTP__ENVIRONMENT", "production"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config =
            AppConfig::load_with("does-not-exist/config", env_overrides().source(Some(vars)))
                .unwrap();

        assert_eq!(config.server.port, 9191);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_explicit_logging_section_is_kept() {
        let vars: config::Map<String, String> = [
            ("OTP__ENVIRONMENT", "production"),
            ("OTP__LOGGING__FORMAT", "compact"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config =
            AppConfig::load_with("does-not-exist/config", env_overrides().source(Some(vars)))
                .unwrap();

        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load_from("does-not-exist/config").unwrap();
        assert_eq!(config.server.port, ServerConfig::default().port);
        assert_eq!(config.otp.code_length, OtpConfig::default().code_length);
    }
}
