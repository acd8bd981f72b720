//! Passcode configuration

use serde::{Deserialize, Serialize};

use super::{invalid, ConfigError};

/// Longest passcode the generator will produce
pub const MAX_CODE_LENGTH: usize = 32;

/// Passcode issuance settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Number of digits in an issued passcode
    pub code_length: usize,

    /// Minutes an issued passcode stays valid
    pub ttl_minutes: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 5,
            ttl_minutes: 5,
        }
    }
}

impl OtpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(invalid("otp.code_length", "must be between 1 and 32"));
        }
        if self.ttl_minutes <= 0 {
            return Err(invalid("otp.ttl_minutes", "must be positive"));
        }
        Ok(())
    }
}
