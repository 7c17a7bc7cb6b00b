use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fineease_core::{DomainError, DomainResult, DonationId, NgoId, UserId, ValueObject};

/// Maximum length of the optional donor message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// A strictly positive donation amount, in the currency's smallest unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl ValueObject for Amount {}

impl Amount {
    pub fn new(value: i64) -> DomainResult<Self> {
        if value <= 0 {
            return Err(DomainError::InvalidAmount);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Donor-supplied fields of a contribution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDonation {
    pub ngo: NgoId,
    pub amount: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationRecord {
    pub id: DonationId,
    pub donor: UserId,
    pub ngo: NgoId,
    pub amount: Amount,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DonationRecord {
    /// Build a ledger entry after the amount and message pass validation.
    ///
    /// The NGO's moderation status is not known here; the ledger checks it.
    pub fn new(donor: UserId, ngo: NgoId, amount: Amount, message: Option<String>, now: DateTime<Utc>) -> DomainResult<Self> {
        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        if message.as_ref().is_some_and(|m| m.chars().count() > MAX_MESSAGE_CHARS) {
            return Err(DomainError::validation(format!(
                "message must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }

        Ok(Self {
            id: DonationId::new(),
            donor,
            ngo,
            amount,
            message,
            created_at: now,
        })
    }
}

/// Ledger-wide aggregates.
///
/// The sum is widened past `i64`: every single amount fits in an `i64`,
/// their total does not have to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DonationTotals {
    pub count: u64,
    pub amount: i128,
}
