use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fineease_core::{DomainError, UserId};

use crate::{Identity, Principal, Role};

/// Session token claims (transport-agnostic).
///
/// Timestamps are seconds since the Unix epoch, as registered JWT claims are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id.
    pub sub: UserId,

    /// Login identity at mint time.
    pub identity: Identity,

    /// Role at mint time.
    pub role: Role,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(principal: &Principal, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: principal.user_id,
            identity: principal.identity.clone(),
            role: principal.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn into_principal(self) -> Principal {
        Principal {
            user_id: self.sub,
            identity: self.identity,
            role: self.role,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl From<TokenValidationError> for DomainError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => DomainError::ExpiredToken,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                DomainError::InvalidToken
            }
        }
    }
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification is done by
/// the [`SessionCodec`](crate::SessionCodec).
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> SessionClaims {
        SessionClaims::new(
            &Principal {
                user_id: UserId::new(),
                identity: Identity::parse("x@example.com").unwrap(),
                role: Role::Donor,
            },
            issued_at,
            issued_at + ttl,
        )
    }

    #[test]
    fn valid_inside_window() {
        let now = Utc::now();
        assert!(validate_claims(&claims(now, Duration::days(7)), now + Duration::days(6)).is_ok());
    }

    #[test]
    fn expired_at_boundary() {
        let now = Utc::now();
        let c = claims(now, Duration::days(7));
        assert_eq!(
            validate_claims(&c, now + Duration::days(7)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(DomainError::from(TokenValidationError::Expired), DomainError::ExpiredToken);
    }

    #[test]
    fn issued_in_future_is_invalid() {
        let now = Utc::now();
        let c = claims(now + Duration::hours(1), Duration::days(7));
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn empty_window_is_invalid() {
        let now = Utc::now();
        let c = claims(now, Duration::zero());
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::InvalidTimeWindow));
    }
}
