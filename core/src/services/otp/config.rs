//! Configuration for the OTP lifecycle service

use otp_shared::config::OtpConfig;

use crate::domain::entities::CODE_LENGTH;

/// Configuration for the OTP lifecycle service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Number of digits in an issued passcode
    pub code_length: usize,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.code_length,
        }
    }
}
