use async_trait::async_trait;

use fineease_core::{StoreError, UserId};

use crate::{DonationRecord, DonationTotals};

/// Append-only collection of donations, owned by the ledger.
#[async_trait]
pub trait DonationStore: Send + Sync {
    async fn append(&self, record: DonationRecord) -> Result<(), StoreError>;

    /// A donor's records in creation order, oldest first.
    async fn list_by_donor(&self, donor: UserId) -> Result<Vec<DonationRecord>, StoreError>;

    async fn totals(&self) -> Result<DonationTotals, StoreError>;
}
