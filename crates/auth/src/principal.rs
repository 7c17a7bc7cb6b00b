use serde::Serialize;

use fineease_core::UserId;

use crate::{Identity, Role};

/// Identity of an authenticated caller, as decoded from its session token.
///
/// The role is the one embedded at mint time; it is not re-read from the
/// identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub identity: Identity,
    pub role: Role,
}

/// The caller of an operation, passed explicitly to every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn role(&self) -> Option<Role> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(p) => Some(p.role),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(p) => Some(p),
        }
    }
}

impl From<Principal> for Caller {
    fn from(value: Principal) -> Self {
        Caller::Authenticated(value)
    }
}
