//! In-memory store adapters for tests and local development.
//!
//! Each store keeps records in a `Vec` so listings come back in insertion
//! order. Uniqueness is checked and the record inserted under one write lock.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fineease_auth::{Identity, IdentityStore, StoredUser};
use fineease_core::{NgoId, StoreError, UserId};
use fineease_donations::{DonationRecord, DonationStore, DonationTotals};
use fineease_registry::{NgoRecord, NgoStatus, NgoStore, StatusCounts};

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::unavailable("lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::unavailable("lock poisoned"))
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<Vec<StoredUser>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn insert(&self, user: StoredUser) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.identity == user.identity) {
            return Err(StoreError::UniqueViolation("identity"));
        }
        users.push(user);
        Ok(())
    }

    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<StoredUser>, StoreError> {
        Ok(read(&self.users)?.iter().find(|u| &u.identity == identity).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(read(&self.users)?.len() as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNgoStore {
    records: RwLock<Vec<NgoRecord>>,
}

impl InMemoryNgoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, keep: impl Fn(&NgoRecord) -> bool) -> Result<Vec<NgoRecord>, StoreError> {
        Ok(read(&self.records)?.iter().filter(|r| keep(r)).cloned().collect())
    }
}

#[async_trait]
impl NgoStore for InMemoryNgoStore {
    async fn insert(&self, record: NgoRecord) -> Result<(), StoreError> {
        let mut records = write(&self.records)?;
        if records
            .iter()
            .any(|r| r.registration_number == record.registration_number)
        {
            return Err(StoreError::UniqueViolation("registration_number"));
        }
        records.push(record);
        Ok(())
    }

    async fn find_by_id(&self, id: NgoId) -> Result<Option<NgoRecord>, StoreError> {
        Ok(read(&self.records)?.iter().find(|r| r.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<NgoRecord>, StoreError> {
        self.filtered(|_| true)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<NgoRecord>, StoreError> {
        self.filtered(|r| r.owner == owner)
    }

    async fn list_by_status(&self, status: NgoStatus) -> Result<Vec<NgoRecord>, StoreError> {
        self.filtered(|r| r.status == status)
    }

    async fn update_status(
        &self,
        id: NgoId,
        status: NgoStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<NgoRecord>, StoreError> {
        let mut records = write(&self.records)?;
        Ok(records.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.updated_at = updated_at;
            r.clone()
        }))
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let mut counts = StatusCounts::default();
        for r in read(&self.records)?.iter() {
            counts.record(r.status);
        }
        Ok(counts)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDonationStore {
    records: RwLock<Vec<DonationRecord>>,
}

impl InMemoryDonationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DonationStore for InMemoryDonationStore {
    async fn append(&self, record: DonationRecord) -> Result<(), StoreError> {
        write(&self.records)?.push(record);
        Ok(())
    }

    async fn list_by_donor(&self, donor: UserId) -> Result<Vec<DonationRecord>, StoreError> {
        Ok(read(&self.records)?
            .iter()
            .filter(|r| r.donor == donor)
            .cloned()
            .collect())
    }

    async fn totals(&self) -> Result<DonationTotals, StoreError> {
        let records = read(&self.records)?;
        Ok(DonationTotals {
            count: records.len() as u64,
            amount: records.iter().map(|r| i128::from(r.amount.value())).sum(),
        })
    }
}
