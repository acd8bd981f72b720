//! Request and response bodies of the OTP endpoints

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Length of the hyphenated UUID form
const HYPHENATED_UUID_LENGTH: usize = 36;

/// Public user ids are hyphenated version 4 UUIDs
fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    let is_uuid4 = user_id.len() == HYPHENATED_UUID_LENGTH
        && Uuid::parse_str(user_id).map_or(false, |id| id.get_version_num() == 4);

    if is_uuid4 {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_uuid"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestOtpRequest {
    /// Public user id (UUID)
    #[validate(custom = "validate_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOtpResponse {
    pub user_id: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ValidateOtpRequest {
    /// Public user id (UUID)
    #[validate(custom = "validate_user_id")]
    pub user_id: String,

    /// Passcode; at most the longest configurable code length
    #[validate(length(min = 1, max = 32))]
    pub otp: String,

    /// Caller's correlation id, used for logging only; fits `otps.request_id`
    #[validate(length(min = 1, max = 255))]
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOtpResponse {
    pub user_id: String,
    pub message: String,
}

impl ValidateOtpResponse {
    pub fn success(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message: "OTP validated successfully.".to_string(),
        }
    }
}
