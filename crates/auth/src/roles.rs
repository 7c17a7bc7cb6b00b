use core::str::FromStr;

use serde::{Deserialize, Serialize};

use fineease_core::DomainError;

/// Role identifier used for RBAC.
///
/// Closed set: the guard matches on it exhaustively, so a new role cannot be
/// introduced without revisiting every grant. Fixed at registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Donor,
    #[serde(alias = "ngo")]
    NgoOwner,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Donor, Role::NgoOwner, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::NgoOwner => "ngo_owner",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "donor" => Ok(Role::Donor),
            "ngo_owner" | "ngo" => Ok(Role::NgoOwner),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}' (expected donor, ngo_owner or admin)"
            ))),
        }
    }
}
