//! `fineease-auth`: identity, session and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the identity
//! store is a port ([`IdentityStore`]) implemented by infra adapters.

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod store;
pub mod token;
pub mod user;

pub use authorize::{AuthorizationExplanation, authorize, can_access, explain_authorization, require};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialVerifier, DEFAULT_SESSION_TTL_DAYS, Registration, Session};
pub use password::{Argon2SecretHasher, HashingError, SecretHasher};
pub use permissions::{Access, Action};
pub use principal::{Caller, Principal};
pub use roles::Role;
pub use store::IdentityStore;
pub use token::{Hs256SessionCodec, SessionCodec, SigningError};
pub use user::{CredentialHash, Identity, StoredUser, User};
