//! Postgres-backed store adapters.
//!
//! ## Error mapping
//!
//! | Postgres                         | StoreError                  |
//! |----------------------------------|-----------------------------|
//! | `23505` on `users_identity_key`  | `UniqueViolation("identity")` |
//! | `23505` on `ngos_registration_…` | `UniqueViolation("registration_number")` |
//! | anything else                    | `Unavailable`               |
//!
//! Listings order by the `seq` column, which follows insertion order.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use fineease_auth::{CredentialHash, Identity, IdentityStore, Role, StoredUser};
use fineease_core::{DonationId, NgoId, StoreError, UserId};
use fineease_donations::{Amount, DonationRecord, DonationStore, DonationTotals};
use fineease_registry::{NgoRecord, NgoStatus, NgoStore, StatusCounts};

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Open a pool and apply the schema. The schema is idempotent.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;
    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
    Ok(pool)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::unavailable(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::unavailable(format!("connection pool closed in {operation}")),
        other => StoreError::unavailable(format!("sqlx error in {operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn corrupt(column: &str, detail: impl core::fmt::Display) -> StoreError {
    StoreError::unavailable(format!("corrupt {column} column: {detail}"))
}

fn decode_user(row: &PgRow) -> Result<StoredUser, StoreError> {
    let get = |e: sqlx::Error| map_sqlx_error("decode_user", e);
    let identity: String = row.try_get("identity").map_err(get)?;
    let role: String = row.try_get("role").map_err(get)?;
    let hash: String = row.try_get("credential_hash").map_err(get)?;
    Ok(StoredUser {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        identity: Identity::parse(&identity).map_err(|e| corrupt("identity", e))?,
        name: row.try_get("name").map_err(get)?,
        role: Role::from_str(&role).map_err(|e| corrupt("role", e))?,
        credential_hash: CredentialHash::from_phc(hash),
        created_at: row.try_get("created_at").map_err(get)?,
    })
}

fn decode_ngo(row: &PgRow) -> Result<NgoRecord, StoreError> {
    let get = |e: sqlx::Error| map_sqlx_error("decode_ngo", e);
    let status: String = row.try_get("status").map_err(get)?;
    Ok(NgoRecord {
        id: NgoId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        owner: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id").map_err(get)?),
        name: row.try_get("name").map_err(get)?,
        registration_number: row.try_get("registration_number").map_err(get)?,
        description: row.try_get("description").map_err(get)?,
        address: row.try_get("address").map_err(get)?,
        contact_email: row.try_get("contact_email").map_err(get)?,
        contact_phone: row.try_get("contact_phone").map_err(get)?,
        status: NgoStatus::from_str(&status).map_err(|e| corrupt("status", e))?,
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

fn decode_donation(row: &PgRow) -> Result<DonationRecord, StoreError> {
    let get = |e: sqlx::Error| map_sqlx_error("decode_donation", e);
    let amount: i64 = row.try_get("amount").map_err(get)?;
    Ok(DonationRecord {
        id: DonationId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        donor: UserId::from_uuid(row.try_get::<Uuid, _>("donor_id").map_err(get)?),
        ngo: NgoId::from_uuid(row.try_get::<Uuid, _>("ngo_id").map_err(get)?),
        amount: Amount::new(amount).map_err(|e| corrupt("amount", e))?,
        message: row.try_get("message").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
    })
}

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: Arc<PgPool>,
}

impl PgIdentityStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert(&self, user: StoredUser) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, identity, name, role, credential_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(user.identity.as_str())
        .bind(user.name.as_deref())
        .bind(user.role.as_str())
        .bind(user.credential_hash.as_phc())
        .bind(user.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UniqueViolation("identity")
            } else {
                map_sqlx_error("insert_user", e)
            }
        })?;
        Ok(())
    }

    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<StoredUser>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE identity = $1")
            .bind(identity.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_identity", e))?;
        row.as_ref().map(decode_user).transpose()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;
        Ok(n.max(0) as u64)
    }
}

#[derive(Clone)]
pub struct PgNgoStore {
    pool: Arc<PgPool>,
}

impl PgNgoStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, operation: &str, query: PgQuery<'_>) -> Result<Vec<NgoRecord>, StoreError> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(decode_ngo).collect()
    }
}

#[async_trait]
impl NgoStore for PgNgoStore {
    #[instrument(skip(self, record), fields(ngo_id = %record.id))]
    async fn insert(&self, record: NgoRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ngos (
                id, owner_id, name, registration_number, description, address,
                contact_email, contact_phone, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(*record.owner.as_uuid())
        .bind(&record.name)
        .bind(&record.registration_number)
        .bind(record.description.as_deref())
        .bind(record.address.as_deref())
        .bind(record.contact_email.as_deref())
        .bind(record.contact_phone.as_deref())
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UniqueViolation("registration_number")
            } else {
                map_sqlx_error("insert_ngo", e)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: NgoId) -> Result<Option<NgoRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM ngos WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_ngo_by_id", e))?;
        row.as_ref().map(decode_ngo).transpose()
    }

    async fn list_all(&self) -> Result<Vec<NgoRecord>, StoreError> {
        self.fetch_many("list_ngos", sqlx::query("SELECT * FROM ngos ORDER BY seq"))
            .await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<NgoRecord>, StoreError> {
        self.fetch_many(
            "list_ngos_by_owner",
            sqlx::query("SELECT * FROM ngos WHERE owner_id = $1 ORDER BY seq").bind(*owner.as_uuid()),
        )
        .await
    }

    async fn list_by_status(&self, status: NgoStatus) -> Result<Vec<NgoRecord>, StoreError> {
        self.fetch_many(
            "list_ngos_by_status",
            sqlx::query("SELECT * FROM ngos WHERE status = $1 ORDER BY seq").bind(status.as_str()),
        )
        .await
    }

    #[instrument(skip(self), fields(ngo_id = %id, status = %status))]
    async fn update_status(
        &self,
        id: NgoId,
        status: NgoStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<NgoRecord>, StoreError> {
        let row = sqlx::query("UPDATE ngos SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *")
            .bind(*id.as_uuid())
            .bind(status.as_str())
            .bind(updated_at)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_ngo_status", e))?;
        row.as_ref().map(decode_ngo).transpose()
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM ngos GROUP BY status")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_ngos", e))?;

        let mut counts = StatusCounts::default();
        for row in &rows {
            let status: String = row.try_get("status").map_err(|e| map_sqlx_error("count_ngos", e))?;
            let n: i64 = row.try_get("n").map_err(|e| map_sqlx_error("count_ngos", e))?;
            let n = n.max(0) as u64;
            match NgoStatus::from_str(&status).map_err(|e| corrupt("status", e))? {
                NgoStatus::Pending => counts.pending = n,
                NgoStatus::Approved => counts.approved = n,
                NgoStatus::Rejected => counts.rejected = n,
            }
        }
        Ok(counts)
    }
}

#[derive(Clone)]
pub struct PgDonationStore {
    pool: Arc<PgPool>,
}

impl PgDonationStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationStore for PgDonationStore {
    #[instrument(skip(self, record), fields(donation_id = %record.id))]
    async fn append(&self, record: DonationRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO donations (id, donor_id, ngo_id, amount, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(*record.donor.as_uuid())
        .bind(*record.ngo.as_uuid())
        .bind(record.amount.value())
        .bind(record.message.as_deref())
        .bind(record.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_donation", e))?;
        Ok(())
    }

    async fn list_by_donor(&self, donor: UserId) -> Result<Vec<DonationRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM donations WHERE donor_id = $1 ORDER BY seq")
            .bind(*donor.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_donations_by_donor", e))?;
        rows.iter().map(decode_donation).collect()
    }

    async fn totals(&self) -> Result<DonationTotals, StoreError> {
        // SUM over BIGINT is NUMERIC; read it as text so it is never narrowed.
        let row = sqlx::query("SELECT COUNT(*) AS n, COALESCE(SUM(amount), 0)::TEXT AS total FROM donations")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("donation_totals", e))?;
        let n: i64 = row.try_get("n").map_err(|e| map_sqlx_error("donation_totals", e))?;
        let total: String = row.try_get("total").map_err(|e| map_sqlx_error("donation_totals", e))?;
        let amount = total
            .parse::<i128>()
            .map_err(|e| StoreError::unavailable(format!("donation_totals: bad sum '{total}': {e}")))?;
        Ok(DonationTotals {
            count: n.max(0) as u64,
            amount,
        })
    }
}
