//! Domain and service error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type returned by every service operation.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Domain-level error.
///
/// Every variant is a caller error: none of them is transient and none is
/// retried. Infrastructure faults are modelled separately by [`StoreError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (missing or malformed field).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("identity is already registered")]
    DuplicateIdentity,

    #[error("registration number is already in use")]
    DuplicateRegistrationNumber,

    /// Unknown identity and wrong secret collapse into this single variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid session token")]
    InvalidToken,

    #[error("session token has expired")]
    ExpiredToken,

    /// No session was presented for an operation that is not public.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Authenticated, but the role does not grant the action.
    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("ngo is not approved")]
    NgoNotApproved,

    #[error("amount must be greater than zero")]
    InvalidAmount,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Stable machine-readable code, used in JSON error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::DuplicateIdentity => "duplicate_identity",
            DomainError::DuplicateRegistrationNumber => "duplicate_registration_number",
            DomainError::InvalidCredentials => "invalid_credentials",
            DomainError::InvalidToken => "invalid_token",
            DomainError::ExpiredToken => "expired_token",
            DomainError::AuthenticationRequired => "authentication_required",
            DomainError::Forbidden => "forbidden",
            DomainError::NotFound => "not_found",
            DomainError::NgoNotApproved => "ngo_not_approved",
            DomainError::InvalidAmount => "invalid_amount",
        }
    }
}

/// Failure reported by a persistence adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write; nothing was stored.
    ///
    /// Carries the name of the constrained field.
    #[error("unique constraint violated on '{0}'")]
    UniqueViolation(&'static str),

    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Error returned at the operation boundary of every service.
///
/// Keeps the domain taxonomy distinct from generic infrastructure failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("infrastructure failure: {0}")]
    Infrastructure(StoreError),

    /// A fault inside the service itself (hashing, signing, worker join).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The domain error, if this is not an infrastructure or internal failure.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Infrastructure(_) | ServiceError::Internal(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Infrastructure(value)
    }
}
