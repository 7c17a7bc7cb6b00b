use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fineease_core::{NgoId, StoreError, UserId};

use crate::{NgoRecord, NgoStatus, StatusCounts};

/// Durable collection of NGO records, owned by the registry.
///
/// Every listing is in creation order, oldest first.
#[async_trait]
pub trait NgoStore: Send + Sync {
    /// Insert a new record.
    ///
    /// Must fail with `StoreError::UniqueViolation("registration_number")`,
    /// without storing anything, when the registration number is taken.
    async fn insert(&self, record: NgoRecord) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: NgoId) -> Result<Option<NgoRecord>, StoreError>;

    async fn list_all(&self) -> Result<Vec<NgoRecord>, StoreError>;

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<NgoRecord>, StoreError>;

    async fn list_by_status(&self, status: NgoStatus) -> Result<Vec<NgoRecord>, StoreError>;

    /// Overwrite the status of one record; `None` if it does not exist.
    async fn update_status(
        &self,
        id: NgoId,
        status: NgoStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<NgoRecord>, StoreError>;

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError>;
}
