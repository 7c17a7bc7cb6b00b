//! Service wiring: stores, credential verifier, registry and ledger.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::info;

use fineease_auth::{
    Action, Argon2SecretHasher, Caller, CredentialVerifier, Hs256SessionCodec, SecretHasher,
    authorize,
};
use fineease_core::ServiceResult;
use fineease_donations::DonationLedger;
use fineease_infra::{AppConfig, Persistence, Stores};
use fineease_registry::NgoRegistry;

/// Platform-wide counters shown on every dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformStatistics {
    pub total_users: u64,
    pub total_ngos: u64,
    pub total_donations: u64,
    pub total_amount: i128,
}

#[derive(Clone)]
pub struct AppServices {
    pub verifier: CredentialVerifier,
    pub registry: NgoRegistry,
    pub ledger: DonationLedger,
}

impl AppServices {
    pub fn new(
        stores: Stores,
        hasher: Arc<dyn SecretHasher>,
        jwt_secret: &str,
        token_ttl: Duration,
    ) -> Self {
        let codec = Arc::new(Hs256SessionCodec::new(jwt_secret.as_bytes()));
        let verifier = CredentialVerifier::new(stores.identities, hasher, codec).with_ttl(token_ttl);
        let registry = NgoRegistry::new(stores.ngos);
        let ledger = DonationLedger::new(stores.donations, registry.clone());
        Self {
            verifier,
            registry,
            ledger,
        }
    }

    /// In-memory stores with the default hasher.
    pub fn in_memory(jwt_secret: &str, token_ttl: Duration) -> Self {
        Self::new(
            Stores::in_memory(),
            Arc::new(Argon2SecretHasher::new()),
            jwt_secret,
            token_ttl,
        )
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let stores = match &config.persistence {
            Persistence::InMemory => {
                info!("using in-memory stores");
                Stores::in_memory()
            }
            Persistence::Postgres {
                database_url,
                max_connections,
            } => build_persistent_stores(database_url, *max_connections).await?,
        };
        Ok(Self::new(
            stores,
            Arc::new(Argon2SecretHasher::new()),
            &config.jwt_secret,
            config.token_ttl,
        ))
    }

    /// Counts across users, NGOs and donations. Any authenticated role.
    pub async fn statistics(&self, caller: &Caller) -> ServiceResult<PlatformStatistics> {
        authorize(caller, Action::ViewStatistics)?;
        let total_users = self.verifier.user_count().await?;
        let ngos = self.registry.status_counts().await?;
        let donations = self.ledger.totals().await?;
        Ok(PlatformStatistics {
            total_users,
            total_ngos: ngos.total(),
            total_donations: donations.count,
            total_amount: donations.amount,
        })
    }
}

#[cfg(feature = "postgres")]
async fn build_persistent_stores(database_url: &str, max_connections: u32) -> anyhow::Result<Stores> {
    info!(max_connections, "connecting to postgres");
    Ok(Stores::postgres(database_url, max_connections).await?)
}

#[cfg(not(feature = "postgres"))]
async fn build_persistent_stores(_database_url: &str, _max_connections: u32) -> anyhow::Result<Stores> {
    anyhow::bail!("USE_PERSISTENT_STORES=true requires building with the `postgres` feature")
}
