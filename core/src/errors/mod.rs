//! Domain-specific error types and error handling.

mod types;

pub use types::OtpError;

use std::fmt::Display;
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Identity not found")]
    IdentityNotFound,

    #[error("OTP generation failed: {message}")]
    Generation { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    // Bridge to lifecycle outcomes
    #[error(transparent)]
    Otp(#[from] OtpError),
}

impl DomainError {
    /// Wrap a storage failure with the step that failed
    pub fn store(context: &str, source: impl Display) -> Self {
        DomainError::Store {
            message: format!("{}: {}", context, source),
        }
    }

    /// Errors caused by the request rather than by the service
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::Store { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
