//! Donation ledger: records contributions against approved NGOs.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use fineease_auth::{Action, Caller, explain_authorization, require};
use fineease_core::{DomainError, ServiceResult};
use fineease_registry::{NgoRegistry, NgoStatus};

use crate::{Amount, DonationRecord, DonationStore, DonationTotals, NewDonation};

#[derive(Clone)]
pub struct DonationLedger {
    store: Arc<dyn DonationStore>,
    registry: NgoRegistry,
}

impl DonationLedger {
    /// The registry is only read, through its public operations.
    pub fn new(store: Arc<dyn DonationStore>, registry: NgoRegistry) -> Self {
        Self { store, registry }
    }

    /// Record a donation from the calling donor.
    ///
    /// Checks run in order: role, amount, message, then the NGO's status as it
    /// stands at call time. Past donations are unaffected by later moderation.
    pub async fn create(&self, caller: &Caller, donation: NewDonation) -> ServiceResult<DonationRecord> {
        let donor = require(caller, Action::CreateDonation).inspect_err(|_| {
            let e = explain_authorization(caller, Action::CreateDonation);
            warn!(reason = %e.reason, "donation denied");
        })?;

        let amount = Amount::new(donation.amount)?;
        let record = DonationRecord::new(donor.user_id, donation.ngo, amount, donation.message, Utc::now())?;

        match self.registry.status_of(record.ngo).await? {
            None => return Err(DomainError::NotFound.into()),
            Some(NgoStatus::Approved) => {}
            Some(status) => {
                warn!(ngo_id = %record.ngo, %status, "donation against unapproved ngo");
                return Err(DomainError::NgoNotApproved.into());
            }
        }

        self.store.append(record.clone()).await?;
        info!(
            donation_id = %record.id,
            donor = %record.donor,
            ngo_id = %record.ngo,
            amount = record.amount.value(),
            "donation recorded"
        );
        Ok(record)
    }

    /// The calling donor's donations, oldest first.
    pub async fn list_mine(&self, caller: &Caller) -> ServiceResult<Vec<DonationRecord>> {
        let donor = require(caller, Action::ListOwnDonations)?;
        Ok(self.store.list_by_donor(donor.user_id).await?)
    }

    pub async fn totals(&self) -> ServiceResult<DonationTotals> {
        Ok(self.store.totals().await?)
    }
}
