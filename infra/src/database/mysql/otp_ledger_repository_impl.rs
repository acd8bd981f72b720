//! MySQL implementation of the OtpLedgerRepository trait.
//!
//! Every operation runs in its own SERIALIZABLE transaction on a dedicated
//! connection. The owning user's row in `users` is locked first, so all
//! ledger work for one user is serialized while other users proceed
//! independently; the passcode rows are then locked with `FOR UPDATE`.
//! Any failure drops the transaction, which rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::{Connection, MySql, MySqlPool, Transaction};
use std::sync::Arc;
use tracing::Span;

use otp_core::domain::entities::{OtpRecord, OtpStatus, UserKey, OTP_TTL_MINUTES};
use otp_core::domain::value_objects::{ConsumeDecision, IssueDecision, LockedOtp};
use otp_core::errors::{DomainError, DomainResult, OtpError};
use otp_core::repositories::OtpLedgerRepository;
use otp_core::services::Clock;

/// MySQL implementation of OtpLedgerRepository
pub struct MySqlOtpLedgerRepository {
    /// Database connection pool
    pool: MySqlPool,
    /// Source of `now` for expiry decisions and timestamps
    clock: Arc<dyn Clock>,
    /// Lifetime of an issued passcode
    ttl: Duration,
    span: Span,
}

impl MySqlOtpLedgerRepository {
    /// Create a new ledger repository with the default passcode lifetime
    pub fn new(pool: MySqlPool, clock: Arc<dyn Clock>, span: Span) -> Self {
        Self::with_ttl(pool, clock, Duration::minutes(OTP_TTL_MINUTES), span)
    }

    pub fn with_ttl(pool: MySqlPool, clock: Arc<dyn Clock>, ttl: Duration, span: Span) -> Self {
        Self {
            pool,
            clock,
            ttl,
            span,
        }
    }

    /// Current instant at the column precision (microseconds)
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    fn store_error(&self, step: &'static str, user_key: UserKey, error: sqlx::Error) -> DomainError {
        tracing::error!(
            parent: &self.span,
            user_key = %user_key,
            step = step,
            error = %error,
            event = "otp_ledger_store_failed",
            "OTP ledger transaction failed"
        );
        DomainError::store(step, error)
    }

    /// Serialize with other transactions for the same user
    async fn lock_user(&self, tx: &mut Transaction<'_, MySql>, user_key: UserKey) -> DomainResult<()> {
        let locked: Option<u64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ? FOR UPDATE")
            .bind(user_key.get())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| self.store_error("lock user row", user_key, e))?;

        locked.map(|_| ()).ok_or(DomainError::IdentityNotFound)
    }

    async fn issue_in_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        user_key: UserKey,
        code: &str,
        request_id: &str,
    ) -> DomainResult<OtpRecord> {
        self.lock_user(tx, user_key).await?;

        let unused: Option<(u64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, expires_at
            FROM otps
            WHERE user_id = ? AND status = ?
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_key.get())
        .bind(OtpStatus::Unused.as_i8())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| self.store_error("lock unused otp", user_key, e))?;

        let now = self.now();
        let unused = unused.map(|(id, expires_at)| LockedOtp { id, expires_at });

        match IssueDecision::decide(unused, now) {
            IssueDecision::RejectActive => return Err(OtpError::AlreadyActive.into()),
            IssueDecision::RetireAndInsert { stale_id } => {
                sqlx::query("UPDATE otps SET status = ? WHERE id = ? AND status = ?")
                    .bind(OtpStatus::Expired.as_i8())
                    .bind(stale_id)
                    .bind(OtpStatus::Unused.as_i8())
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| self.store_error("expire stale otp", user_key, e))?;

                tracing::debug!(
                    parent: &self.span,
                    user_key = %user_key,
                    otp_id = stale_id,
                    event = "otp_expired",
                    "Retired stale OTP"
                );
            }
            IssueDecision::Insert => {}
        }

        let mut record = OtpRecord::new(0, user_key, code, request_id, now, self.ttl);

        let result = sqlx::query(
            r#"
            INSERT INTO otps (user_id, code, request_id, status, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_key.get())
        .bind(&record.code)
        .bind(&record.request_id)
        .bind(record.status.as_i8())
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| self.store_error("insert otp", user_key, e))?;

        record.id = result.last_insert_id();
        Ok(record)
    }

    async fn consume_in_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        user_key: UserKey,
        code: &str,
    ) -> DomainResult<()> {
        self.lock_user(tx, user_key).await?;

        let matched: Option<(u64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, expires_at
            FROM otps
            WHERE user_id = ? AND code = ? AND status = ?
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_key.get())
        .bind(code)
        .bind(OtpStatus::Unused.as_i8())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| self.store_error("lock matching otp", user_key, e))?;

        let matched = matched.map(|(id, expires_at)| LockedOtp { id, expires_at });

        match ConsumeDecision::decide(matched, self.now()) {
            ConsumeDecision::Invalid => Err(OtpError::Invalid.into()),
            ConsumeDecision::Expired { .. } => Err(OtpError::Expired.into()),
            ConsumeDecision::MarkUsed { id } => {
                sqlx::query("UPDATE otps SET status = ? WHERE id = ? AND status = ?")
                    .bind(OtpStatus::Used.as_i8())
                    .bind(id)
                    .bind(OtpStatus::Unused.as_i8())
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| self.store_error("mark otp used", user_key, e))?;
                Ok(())
            }
        }
    }
}

/// Business rejections commit; store failures and unknown users roll back
fn commits(outcome: &DomainResult<impl Sized>) -> bool {
    matches!(outcome, Ok(_) | Err(DomainError::Otp(_)))
}

#[async_trait]
impl OtpLedgerRepository for MySqlOtpLedgerRepository {
    async fn issue_or_reject(
        &self,
        user_key: UserKey,
        code: &str,
        request_id: &str,
    ) -> DomainResult<OtpRecord> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.store_error("acquire connection", user_key, e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *conn)
            .await
            .map_err(|e| self.store_error("set isolation level", user_key, e))?;

        let mut tx = conn
            .begin()
            .await
            .map_err(|e| self.store_error("begin transaction", user_key, e))?;

        let outcome = self.issue_in_tx(&mut tx, user_key, code, request_id).await;
        if !commits(&outcome) {
            return outcome;
        }

        tx.commit()
            .await
            .map_err(|e| self.store_error("commit transaction", user_key, e))?;

        outcome
    }

    async fn consume(&self, user_key: UserKey, code: &str) -> DomainResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.store_error("acquire connection", user_key, e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *conn)
            .await
            .map_err(|e| self.store_error("set isolation level", user_key, e))?;

        let mut tx = conn
            .begin()
            .await
            .map_err(|e| self.store_error("begin transaction", user_key, e))?;

        let outcome = self.consume_in_tx(&mut tx, user_key, code).await;
        if !commits(&outcome) {
            return outcome;
        }

        tx.commit()
            .await
            .map_err(|e| self.store_error("commit transaction", user_key, e))?;

        outcome
    }
}
