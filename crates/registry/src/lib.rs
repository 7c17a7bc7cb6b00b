//! `fineease-registry`: NGO records and their moderation lifecycle.

pub mod ngo;
pub mod registry;
pub mod store;

pub use ngo::{Decision, NewNgo, NgoRecord, NgoStatus, StatusCounts};
pub use registry::NgoRegistry;
pub use store::NgoStore;
