//! `fineease-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult, ServiceError, ServiceResult, StoreError};
pub use id::{DonationId, NgoId, UserId};
pub use value_object::ValueObject;
