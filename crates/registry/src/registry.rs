//! NGO registry service: every read and write of NGO records goes through here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use fineease_auth::{Action, Caller, authorize, explain_authorization};
use fineease_core::{DomainError, DomainResult, NgoId, ServiceResult, StoreError};

use crate::{Decision, NewNgo, NgoRecord, NgoStatus, NgoStore, StatusCounts};

/// Authorize, logging the explanation on denial.
fn guard(caller: &Caller, action: Action) -> DomainResult<()> {
    authorize(caller, action).inspect_err(|_| {
        let e = explain_authorization(caller, action);
        warn!(action = %action, reason = %e.reason, "ngo registry access denied");
    })
}

#[derive(Clone)]
pub struct NgoRegistry {
    store: Arc<dyn NgoStore>,
}

impl NgoRegistry {
    pub fn new(store: Arc<dyn NgoStore>) -> Self {
        Self { store }
    }

    /// Submit a new NGO owned by the caller. Always starts `pending`.
    pub async fn create(&self, caller: &Caller, fields: NewNgo) -> ServiceResult<NgoRecord> {
        guard(caller, Action::CreateNgo)?;
        let owner = caller.principal().ok_or(DomainError::AuthenticationRequired)?;

        let record = NgoRecord::submit(owner.user_id, fields, Utc::now())?;
        match self.store.insert(record.clone()).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => {
                return Err(DomainError::DuplicateRegistrationNumber.into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(ngo_id = %record.id, owner = %record.owner, "ngo submitted");
        Ok(record)
    }

    pub async fn approve(&self, caller: &Caller, id: NgoId) -> ServiceResult<NgoRecord> {
        self.moderate(caller, id, Decision::Approve).await
    }

    pub async fn reject(&self, caller: &Caller, id: NgoId) -> ServiceResult<NgoRecord> {
        self.moderate(caller, id, Decision::Reject).await
    }

    async fn moderate(&self, caller: &Caller, id: NgoId, decision: Decision) -> ServiceResult<NgoRecord> {
        let action = match decision {
            Decision::Approve => Action::ApproveNgo,
            Decision::Reject => Action::RejectNgo,
        };
        guard(caller, action)?;

        let mut record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let now = Utc::now();
        if !record.moderate(decision, now) {
            return Ok(record);
        }

        // Last write wins against a concurrent decision on the same record.
        let updated = self
            .store
            .update_status(id, record.status, now)
            .await?
            .ok_or(DomainError::NotFound)?;

        info!(ngo_id = %id, status = %updated.status, "ngo moderated");
        Ok(updated)
    }

    /// Every record regardless of status, oldest first. Admin only.
    pub async fn list_all(&self, caller: &Caller) -> ServiceResult<Vec<NgoRecord>> {
        guard(caller, Action::ListAllNgos)?;
        Ok(self.store.list_all().await?)
    }

    /// Admin only; authorization is checked before existence.
    pub async fn get_by_id(&self, caller: &Caller, id: NgoId) -> ServiceResult<NgoRecord> {
        guard(caller, Action::GetNgo)?;
        Ok(self.store.find_by_id(id).await?.ok_or(DomainError::NotFound)?)
    }

    /// The caller's own records, any status.
    pub async fn list_mine(&self, caller: &Caller) -> ServiceResult<Vec<NgoRecord>> {
        guard(caller, Action::ListOwnNgos)?;
        let owner = caller.principal().ok_or(DomainError::AuthenticationRequired)?;
        Ok(self.store.list_by_owner(owner.user_id).await?)
    }

    /// Public discovery: approved records only.
    pub async fn list_approved(&self) -> ServiceResult<Vec<NgoRecord>> {
        Ok(self.store.list_by_status(NgoStatus::Approved).await?)
    }

    /// Current status of a record, read at call time.
    ///
    /// Used by other components that gate on moderation (the donation ledger).
    pub async fn status_of(&self, id: NgoId) -> ServiceResult<Option<NgoStatus>> {
        Ok(self.store.find_by_id(id).await?.map(|r| r.status))
    }

    pub async fn status_counts(&self) -> ServiceResult<StatusCounts> {
        Ok(self.store.count_by_status().await?)
    }
}
