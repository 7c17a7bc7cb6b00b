//! Store adapters behind the ports declared by the domain crates.

use std::sync::Arc;

use fineease_auth::IdentityStore;
use fineease_donations::DonationStore;
use fineease_registry::NgoStore;

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryDonationStore, InMemoryIdentityStore, InMemoryNgoStore};

/// One adapter per port, ready to hand to the services.
#[derive(Clone)]
pub struct Stores {
    pub identities: Arc<dyn IdentityStore>,
    pub ngos: Arc<dyn NgoStore>,
    pub donations: Arc<dyn DonationStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            identities: Arc::new(InMemoryIdentityStore::new()),
            ngos: Arc::new(InMemoryNgoStore::new()),
            donations: Arc::new(InMemoryDonationStore::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub async fn postgres(database_url: &str, max_connections: u32) -> Result<Self, fineease_core::StoreError> {
        let pool = Arc::new(postgres::connect(database_url, max_connections).await?);
        Ok(Self {
            identities: Arc::new(postgres::PgIdentityStore::new(pool.clone())),
            ngos: Arc::new(postgres::PgNgoStore::new(pool.clone())),
            donations: Arc::new(postgres::PgDonationStore::new(pool)),
        })
    }
}
