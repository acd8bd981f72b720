//! Unit tests for mock identity repository implementation

use crate::domain::entities::UserKey;
use crate::errors::DomainError;
use crate::repositories::identity::{IdentityRepository, MockIdentityRepository};

#[tokio::test]
async fn test_resolve_registered_identity() {
    let repo = MockIdentityRepository::new();
    repo.insert("4f1c2d9e-1111-4aaa-8bbb-0123456789ab", UserKey::new(42)).await;

    let key = repo.resolve("4f1c2d9e-1111-4aaa-8bbb-0123456789ab").await.unwrap();
    assert_eq!(key, UserKey::new(42));
}

#[tokio::test]
async fn test_resolve_unknown_identity() {
    let repo = MockIdentityRepository::new();

    let result = repo.resolve("missing").await;
    assert!(matches!(result, Err(DomainError::IdentityNotFound)));
}

#[tokio::test]
async fn test_resolve_failure_is_store_error() {
    let repo = MockIdentityRepository::new();
    repo.insert("user", UserKey::new(1)).await;
    repo.set_should_fail(true);

    let result = repo.resolve("user").await;
    assert!(matches!(result, Err(DomainError::Store { .. })));
}
