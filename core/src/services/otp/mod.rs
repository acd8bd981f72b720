//! OTP lifecycle service module
//!
//! Ties identity lookup, passcode generation and the ledger store together:
//! - issuing a passcode for a user, refused while a live one exists
//! - validating a passcode, consuming it at most once

mod config;
mod generator;
mod service;


pub use config::OtpServiceConfig;
pub use generator::{generate_digits, OsRngOtpGenerator, OtpGenerator, StaticOtpGenerator};
pub use service::OtpService;
