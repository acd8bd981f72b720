//! In-memory implementation of OtpLedgerRepository
//!
//! All ledger work is serialized by one async mutex, which stands in for the
//! row locks of the MySQL ledger. Used by tests and local runs.

use async_trait::async_trait;
use chrono::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{OtpRecord, UserKey, OTP_TTL_MINUTES};
use crate::domain::value_objects::{ConsumeDecision, IssueDecision, LockedOtp};
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::services::clock::Clock;

use super::r#trait::OtpLedgerRepository;

#[derive(Default)]
struct LedgerState {
    records: Vec<OtpRecord>,
    next_id: u64,
}

/// Mock ledger repository keeping every record in memory
pub struct MockOtpLedgerRepository {
    state: Mutex<LedgerState>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    should_fail: AtomicBool,
}

impl MockOtpLedgerRepository {
    /// Create an empty ledger with the default passcode lifetime
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::minutes(OTP_TTL_MINUTES))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                records: Vec::new(),
                next_id: 1,
            }),
            clock,
            ttl,
            should_fail: AtomicBool::new(false),
        }
    }

    /// Make every operation fail with a store error before touching state
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Snapshot of every record in creation order
    pub async fn records(&self) -> Vec<OtpRecord> {
        self.state.lock().await.records.clone()
    }

    /// Snapshot of one user's records in creation order
    pub async fn records_for(&self, user_key: UserKey) -> Vec<OtpRecord> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .filter(|r| r.user_key == user_key)
            .cloned()
            .collect()
    }

    fn check_available(&self, operation: &str) -> DomainResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::store(operation, "mock ledger failure"));
        }
        Ok(())
    }
}

fn find_mut(records: &mut [OtpRecord], id: u64) -> DomainResult<&mut OtpRecord> {
    records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| DomainError::store("locate locked otp", format!("record {} vanished", id)))
}

#[async_trait]
impl OtpLedgerRepository for MockOtpLedgerRepository {
    async fn issue_or_reject(
        &self,
        user_key: UserKey,
        code: &str,
        request_id: &str,
    ) -> DomainResult<OtpRecord> {
        self.check_available("issue otp")?;

        let mut state = self.state.lock().await;
        let now = self.clock.now();

        let unused = state
            .records
            .iter()
            .find(|r| r.user_key == user_key && r.is_unused())
            .map(LockedOtp::from);

        match IssueDecision::decide(unused, now) {
            IssueDecision::RejectActive => return Err(OtpError::AlreadyActive.into()),
            IssueDecision::RetireAndInsert { stale_id } => {
                find_mut(&mut state.records, stale_id)?
                    .mark_expired()
                    .map_err(|e| DomainError::store("expire stale otp", e))?;
            }
            IssueDecision::Insert => {}
        }

        let id = state.next_id;
        state.next_id += 1;

        let record = OtpRecord::new(id, user_key, code, request_id, now, self.ttl);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn consume(&self, user_key: UserKey, code: &str) -> DomainResult<()> {
        self.check_available("consume otp")?;

        let mut state = self.state.lock().await;
        let now = self.clock.now();

        let matched = state
            .records
            .iter()
            .find(|r| r.user_key == user_key && r.code == code && r.is_unused())
            .map(LockedOtp::from);

        match ConsumeDecision::decide(matched, now) {
            ConsumeDecision::Invalid => Err(OtpError::Invalid.into()),
            ConsumeDecision::Expired { .. } => Err(OtpError::Expired.into()),
            ConsumeDecision::MarkUsed { id } => find_mut(&mut state.records, id)?
                .mark_used()
                .map_err(|e| DomainError::store("mark otp used", e)),
        }
    }
}
