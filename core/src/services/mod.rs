//! Business services containing domain logic and use cases.

pub mod clock;
pub mod otp;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use otp::{
    generate_digits, OsRngOtpGenerator, OtpGenerator, OtpService, OtpServiceConfig,
    StaticOtpGenerator,
};
