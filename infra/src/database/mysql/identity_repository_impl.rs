//! MySQL implementation of the IdentityRepository trait.

use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::Span;

use otp_core::domain::entities::UserKey;
use otp_core::errors::{DomainError, DomainResult};
use otp_core::repositories::IdentityRepository;

/// Resolves public user ids against the `users` table
pub struct MySqlIdentityRepository {
    /// Database connection pool
    pool: MySqlPool,
    span: Span,
}

impl MySqlIdentityRepository {
    pub fn new(pool: MySqlPool, span: Span) -> Self {
        Self { pool, span }
    }
}

#[async_trait]
impl IdentityRepository for MySqlIdentityRepository {
    async fn resolve(&self, public_id: &str) -> DomainResult<UserKey> {
        let key: Option<u64> = sqlx::query_scalar("SELECT id FROM users WHERE uuid = ?")
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    parent: &self.span,
                    user_id = public_id,
                    error = %e,
                    event = "identity_lookup_failed",
                    "Failed to query users table"
                );
                DomainError::store("resolve identity", e)
            })?;

        key.map(UserKey::new).ok_or(DomainError::IdentityNotFound)
    }
}
