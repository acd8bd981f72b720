//! MySQL repository implementations

pub mod identity_repository_impl;
pub mod otp_ledger_repository_impl;

pub use identity_repository_impl::MySqlIdentityRepository;
pub use otp_ledger_repository_impl::MySqlOtpLedgerRepository;
