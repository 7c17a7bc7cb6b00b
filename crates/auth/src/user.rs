//! Users as held by the identity store, and their public view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fineease_core::{DomainError, DomainResult, UserId, ValueObject};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Login handle of a user: an email address, trimmed and lowercased.
///
/// Two registrations that differ only in case or surrounding whitespace map
/// to the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl ValueObject for Identity {}

impl Identity {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("email is required"));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(DomainError::validation("invalid email format"));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Credential hash
// ─────────────────────────────────────────────────────────────────────────────

/// One-way hash of a user's secret (PHC string format).
///
/// Deliberately not `Serialize`, and `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// A user record as persisted by the identity store.
///
/// Only the credential verifier reads `credential_hash`; everything that
/// leaves the auth boundary is a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: UserId,
    pub identity: Identity,
    pub name: Option<String>,
    pub role: Role,
    pub credential_hash: CredentialHash,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user (never carries the credential hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "email")]
    pub identity: Identity,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredUser> for User {
    fn from(value: &StoredUser) -> Self {
        Self {
            id: value.id,
            identity: value.identity.clone(),
            name: value.name.clone(),
            role: value.role,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_case_normalized() {
        let a = Identity::parse("  Alice@Example.COM ").unwrap();
        let b = Identity::parse("alice@example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "alice@example.com");
    }

    #[test]
    fn identity_rejects_malformed_input() {
        for raw in ["", "   ", "alice", "@example.com", "alice@", "a@b@c", "al ice@example.com"] {
            assert!(Identity::parse(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn public_user_never_serializes_a_hash() {
        let stored = StoredUser {
            id: UserId::new(),
            identity: Identity::parse("bob@example.com").unwrap(),
            name: Some("Bob".to_string()),
            role: Role::Donor,
            credential_hash: CredentialHash::from_phc("$argon2id$v=19$secret"),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(User::from(&stored)).unwrap();
        assert_eq!(json["email"], "bob@example.com");
        assert_eq!(json["role"], "donor");
        assert!(!json.to_string().contains("argon2"));
        assert!(!format!("{stored:?}").contains("argon2"));
    }
}
