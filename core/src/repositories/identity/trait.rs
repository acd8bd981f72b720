//! Identity repository trait for resolving public user ids.

use async_trait::async_trait;

use crate::domain::entities::UserKey;
use crate::errors::DomainResult;

/// Read-only lookup from the public user identifier to the internal key
///
/// The public identifier is an opaque string (a UUID in practice) handed
/// out to clients; the internal key is what the ledger stores.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Resolve a public user id
    ///
    /// # Returns
    /// * `Ok(UserKey)` - The internal key of the user
    /// * `Err(DomainError::IdentityNotFound)` - No user has this public id
    /// * `Err(DomainError::Store)` - The identity store failed
    async fn resolve(&self, public_id: &str) -> DomainResult<UserKey>;
}
