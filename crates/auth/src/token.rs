//! Session token signing and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use fineease_core::{DomainError, DomainResult};

use crate::{SessionClaims, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("session token could not be signed: {0}")]
pub struct SigningError(pub String);

/// Tamper-evident encode/decode pair for session claims.
pub trait SessionCodec: Send + Sync {
    fn encode(&self, claims: &SessionClaims) -> Result<String, SigningError>;

    /// Verify the signature and the time window against `now`.
    ///
    /// Pure: never consults the identity store.
    fn decode(&self, token: &str, now: DateTime<Utc>) -> DomainResult<SessionClaims>;
}

/// HMAC-SHA256 JWT codec.
#[derive(Clone)]
pub struct Hs256SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Hs256SessionCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

impl core::fmt::Debug for Hs256SessionCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Hs256SessionCodec")
    }
}

impl SessionCodec for Hs256SessionCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, SigningError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| SigningError(e.to_string()))
    }

    fn decode(&self, token: &str, now: DateTime<Utc>) -> DomainResult<SessionClaims> {
        // Expiry is checked below against the caller-supplied clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::ExpiredToken,
                _ => DomainError::InvalidToken,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
