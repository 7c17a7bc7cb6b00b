//! NGO registration records and the moderation state machine.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fineease_core::{DomainError, DomainResult, NgoId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Moderation status
// ─────────────────────────────────────────────────────────────────────────────

/// Moderation status of an NGO record.
///
/// ```text
///            approve            reject
/// pending ───────────► approved ◄──────► rejected
///    │                               ▲
///    └───────────── reject ──────────┘
/// ```
///
/// Approve and reject are overwrites: either admin action may be invoked from
/// any state, and nothing leads back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NgoStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl NgoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NgoStatus::Pending => "pending",
            NgoStatus::Approved => "approved",
            NgoStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for NgoStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NgoStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NgoStatus::Pending),
            "approved" => Ok(NgoStatus::Approved),
            "rejected" => Ok(NgoStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown ngo status '{other}'"))),
        }
    }
}

/// An admin moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The status a record holds after this decision, whatever it held before.
    pub fn target(&self) -> NgoStatus {
        match self {
            Decision::Approve => NgoStatus::Approved,
            Decision::Reject => NgoStatus::Rejected,
        }
    }
}

/// Number of records per moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.approved + self.rejected
    }

    pub fn record(&mut self, status: NgoStatus) {
        match status {
            NgoStatus::Pending => self.pending += 1,
            NgoStatus::Approved => self.approved += 1,
            NgoStatus::Rejected => self.rejected += 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// Owner-supplied fields of an NGO submission.
///
/// There is no status here: a submission always starts `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct NewNgo {
    pub name: String,
    pub registration_number: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgoRecord {
    pub id: NgoId,
    pub owner: UserId,
    pub name: String,
    pub registration_number: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: NgoStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NgoRecord {
    /// Validate a submission and build the `pending` record for it.
    pub fn submit(owner: UserId, fields: NewNgo, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = fields.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }

        let registration_number = fields.registration_number.trim().to_string();
        if registration_number.is_empty() {
            return Err(DomainError::validation("registration number is required"));
        }

        let contact_email = optional(fields.contact_email);
        if let Some(email) = &contact_email {
            if !email.contains('@') {
                return Err(DomainError::validation("invalid contact email"));
            }
        }

        Ok(Self {
            id: NgoId::new(),
            owner,
            name,
            registration_number,
            description: optional(fields.description),
            address: optional(fields.address),
            contact_email,
            contact_phone: optional(fields.contact_phone),
            status: NgoStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a moderation decision. Returns `false` when the record already
    /// holds the target status (nothing to write).
    pub fn moderate(&mut self, decision: Decision, now: DateTime<Utc>) -> bool {
        let target = decision.target();
        if self.status == target {
            return false;
        }
        self.status = target;
        self.updated_at = now;
        true
    }

    /// Visibility predicate for callers that are neither owner nor admin.
    pub fn is_publicly_visible(&self) -> bool {
        self.status == NgoStatus::Approved
    }
}
