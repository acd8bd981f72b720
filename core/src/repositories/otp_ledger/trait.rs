//! Ledger repository trait for the passcode lifecycle.

use async_trait::async_trait;

use crate::domain::entities::{OtpRecord, UserKey};
use crate::errors::DomainResult;

/// Durable owner of passcode state
///
/// Implementations must make each operation atomic and serialize work for
/// the same user, so that at most one `Unused` record exists per user and a
/// passcode is consumed at most once, no matter how many callers race.
/// Decisions are taken with `IssueDecision::decide` and
/// `ConsumeDecision::decide` against the implementation's clock.
#[async_trait]
pub trait OtpLedgerRepository: Send + Sync {
    /// Record a new passcode unless the user already holds a live one
    ///
    /// A lapsed `Unused` record is marked `Expired` in the same transaction
    /// before the new record is inserted.
    ///
    /// # Returns
    /// * `Ok(OtpRecord)` - The inserted `Unused` record
    /// * `Err(DomainError::Otp(OtpError::AlreadyActive))` - A live passcode exists; nothing changed
    /// * `Err(DomainError::Store)` - The transaction failed and was rolled back
    async fn issue_or_reject(
        &self,
        user_key: UserKey,
        code: &str,
        request_id: &str,
    ) -> DomainResult<OtpRecord>;

    /// Consume the user's unused passcode matching `code`
    ///
    /// # Returns
    /// * `Ok(())` - The passcode is now `Used`
    /// * `Err(DomainError::Otp(OtpError::Invalid))` - No unused passcode matches
    /// * `Err(DomainError::Otp(OtpError::Expired))` - The match is past expiry; it stays `Unused`
    /// * `Err(DomainError::Store)` - The transaction failed and was rolled back
    async fn consume(&self, user_key: UserKey, code: &str) -> DomainResult<()>;
}
