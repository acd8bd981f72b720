pub mod identity;
pub mod otp_ledger;

pub use identity::{IdentityRepository, MockIdentityRepository};
pub use otp_ledger::{MockOtpLedgerRepository, OtpLedgerRepository};
