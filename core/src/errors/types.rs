//! Passcode lifecycle error types
//!
//! These are business outcomes of a committed ledger transaction, not
//! store failures. Messages are the ones returned to API clients.

use thiserror::Error;

/// Negative outcomes of issuing or consuming a passcode
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpError {
    /// An unused, unexpired passcode already exists for the user
    #[error("there is still an active otp")]
    AlreadyActive,

    /// No unused passcode matches; wrong code, already used, or never issued
    #[error("invalid otp")]
    Invalid,

    /// The matching passcode is past its expiry
    #[error("otp expired")]
    Expired,
}

impl OtpError {
    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            OtpError::AlreadyActive => "otp_already_active",
            OtpError::Invalid => "invalid_otp",
            OtpError::Expired => "otp_expired",
        }
    }
}
