//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. A login identity or a
/// donation amount is a value object: two instances holding the same value
/// are interchangeable.
///
/// Construction is where validation happens. Once a value object exists it is
/// known to be well-formed, so downstream code never re-checks it:
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Amount(i64);
///
/// impl ValueObject for Amount {}
///
/// impl Amount {
///     fn new(v: i64) -> Result<Self, DomainError> {
///         if v <= 0 { return Err(DomainError::InvalidAmount); }
///         Ok(Self(v))
///     }
/// }
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
