use async_trait::async_trait;

use fineease_core::StoreError;

use crate::{Identity, StoredUser};

/// Durable collection of users, owned by the credential verifier.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new user.
    ///
    /// Must fail with `StoreError::UniqueViolation("identity")`, without
    /// storing anything, when the identity is already present.
    async fn insert(&self, user: StoredUser) -> Result<(), StoreError>;

    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<StoredUser>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
