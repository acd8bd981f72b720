//! Mock implementation of IdentityRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::UserKey;
use crate::errors::{DomainError, DomainResult};

use super::r#trait::IdentityRepository;

/// Mock identity repository backed by a map of public id to user key
pub struct MockIdentityRepository {
    identities: Arc<RwLock<HashMap<String, UserKey>>>,
    should_fail: AtomicBool,
}

impl MockIdentityRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self {
            identities: Arc::new(RwLock::new(HashMap::new())),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Register a user
    pub async fn insert(&self, public_id: impl Into<String>, user_key: UserKey) {
        self.identities.write().await.insert(public_id.into(), user_key);
    }

    /// Make every lookup fail with a store error
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }
}

impl Default for MockIdentityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityRepository for MockIdentityRepository {
    async fn resolve(&self, public_id: &str) -> DomainResult<UserKey> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::store("resolve identity", "mock identity store failure"));
        }

        let identities = self.identities.read().await;
        identities
            .get(public_id)
            .copied()
            .ok_or(DomainError::IdentityNotFound)
    }
}
