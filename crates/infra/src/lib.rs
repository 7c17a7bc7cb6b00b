//! Infrastructure layer: store adapters and configuration.

pub mod config;
pub mod store;


pub use config::{AppConfig, ConfigError, Persistence};
pub use store::Stores;
