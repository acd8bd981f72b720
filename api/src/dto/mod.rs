//! Data transfer objects for the HTTP API

pub mod error;
pub mod otp;

pub use error::{ErrorResponse, ErrorResponseExt};
pub use otp::{RequestOtpRequest, RequestOtpResponse, ValidateOtpRequest, ValidateOtpResponse};
