//! Credential verifier: registration, authentication and session decoding.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use fineease_core::{DomainError, DomainResult, ServiceError, ServiceResult, StoreError, UserId};

use crate::{
    CredentialHash, Identity, IdentityStore, Principal, Role, SecretHasher, SessionClaims,
    SessionCodec, StoredUser, User,
};

/// Session lifetime used unless configured otherwise.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Hashed once at construction; unknown identities are verified against it.
const DECOY_SECRET: &str = "fineease-decoy-secret";

/// Input of [`CredentialVerifier::register`].
#[derive(Clone)]
pub struct Registration {
    pub identity: String,
    pub secret: String,
    pub role: Role,
    pub name: Option<String>,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("identity", &self.identity)
            .field("role", &self.role)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A freshly minted session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Owns the identity store; the only component that ever sees a credential hash.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn IdentityStore>,
    hasher: Arc<dyn SecretHasher>,
    codec: Arc<dyn SessionCodec>,
    ttl: Duration,
    decoy: Option<CredentialHash>,
}

impl CredentialVerifier {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: Arc<dyn SecretHasher>,
        codec: Arc<dyn SessionCodec>,
    ) -> Self {
        let decoy = match hasher.hash(DECOY_SECRET) {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(error = %e, "decoy credential could not be hashed");
                None
            }
        };
        Self {
            store,
            hasher,
            codec,
            ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            decoy,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Register a new user. Fails with `DuplicateIdentity` if the identity exists,
    /// leaving the stored user untouched.
    #[tracing::instrument(skip(self, registration), fields(role = %registration.role))]
    pub async fn register(&self, registration: Registration) -> ServiceResult<User> {
        let identity = Identity::parse(&registration.identity)?;
        if registration.secret.is_empty() {
            return Err(DomainError::validation("password is required").into());
        }
        let name = registration
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if self.store.find_by_identity(&identity).await?.is_some() {
            return Err(DomainError::DuplicateIdentity.into());
        }

        let stored = StoredUser {
            id: UserId::new(),
            identity,
            name,
            role: registration.role,
            credential_hash: self.hash_secret(registration.secret).await?,
            created_at: Utc::now(),
        };
        let user = User::from(&stored);

        match self.store.insert(stored).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same identity.
            Err(StoreError::UniqueViolation(_)) => return Err(DomainError::DuplicateIdentity.into()),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Check a presented secret and mint a session token.
    ///
    /// Unknown identity and wrong secret both fail with `InvalidCredentials`.
    pub async fn authenticate(&self, identity: &str, secret: &str) -> ServiceResult<Session> {
        self.authenticate_at(identity, secret, Utc::now()).await
    }

    #[tracing::instrument(skip(self, identity, secret))]
    pub async fn authenticate_at(
        &self,
        identity: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Session> {
        let found = match Identity::parse(identity) {
            Ok(identity) => self.store.find_by_identity(&identity).await?,
            Err(_) => None,
        };

        // Every failure path pays for exactly one hash verification.
        let verified = match found {
            Some(u) => {
                let ok = self.verify_secret(secret, u.credential_hash.clone()).await?;
                ok.then_some(u)
            }
            None => {
                if let Some(decoy) = &self.decoy {
                    self.verify_secret(secret, decoy.clone()).await?;
                }
                None
            }
        };
        let Some(stored) = verified else {
            warn!("authentication failed");
            return Err(DomainError::InvalidCredentials.into());
        };

        let user = User::from(&stored);
        let principal = Principal {
            user_id: user.id,
            identity: user.identity.clone(),
            role: user.role,
        };
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ServiceError::internal(format!("session ttl {} is out of range", self.ttl)))?;
        let token = self
            .codec
            .encode(&SessionClaims::new(&principal, now, expires_at))
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        info!(user_id = %user.id, role = %user.role, "session issued");
        Ok(Session {
            token,
            expires_at,
            user,
        })
    }

    /// Decode a session token into the principal it asserts.
    ///
    /// Pure function of the token: the role is the one embedded at mint time.
    pub fn decode(&self, token: &str) -> DomainResult<Principal> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<Principal> {
        Ok(self.codec.decode(token, now)?.into_principal())
    }

    pub async fn user_count(&self) -> ServiceResult<u64> {
        Ok(self.store.count().await?)
    }

    async fn hash_secret(&self, secret: String) -> ServiceResult<CredentialHash> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| ServiceError::internal(format!("hashing task failed: {e}")))?
            .map_err(|e| ServiceError::internal(e.to_string()))
    }

    async fn verify_secret(&self, secret: &str, hash: CredentialHash) -> ServiceResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| ServiceError::internal(format!("verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Argon2SecretHasher, HashingError, Hs256SessionCodec, SigningError};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::{self, ThreadId};

    #[derive(Default)]
    struct MemoryIdentityStore {
        users: Mutex<Vec<StoredUser>>,
    }

    #[async_trait]
    impl IdentityStore for MemoryIdentityStore {
        async fn insert(&self, user: StoredUser) -> Result<(), StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.identity == user.identity) {
                return Err(StoreError::UniqueViolation("identity"));
            }
            users.push(user);
            Ok(())
        }

        async fn find_by_identity(&self, identity: &Identity) -> Result<Option<StoredUser>, StoreError> {
            Ok(self.users.lock().unwrap().iter().find(|u| &u.identity == identity).cloned())
        }

        async fn count(&self) -> Result<u64, StoreError> {
            Ok(self.users.lock().unwrap().len() as u64)
        }
    }

    /// Argon2 hasher that records how often, and on which threads, it runs.
    struct RecordingHasher {
        inner: Argon2SecretHasher,
        verifies: AtomicUsize,
        threads: Mutex<Vec<ThreadId>>,
    }

    impl RecordingHasher {
        fn new() -> Self {
            Self {
                inner: Argon2SecretHasher::with_cost(1024, 1).unwrap(),
                verifies: AtomicUsize::new(0),
                threads: Mutex::new(Vec::new()),
            }
        }

        fn reset(&self) {
            self.verifies.store(0, Ordering::SeqCst);
            self.threads.lock().unwrap().clear();
        }
    }

    impl SecretHasher for RecordingHasher {
        fn hash(&self, secret: &str) -> Result<CredentialHash, HashingError> {
            self.threads.lock().unwrap().push(thread::current().id());
            self.inner.hash(secret)
        }

        fn verify(&self, secret: &str, hash: &CredentialHash) -> bool {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            self.threads.lock().unwrap().push(thread::current().id());
            self.inner.verify(secret, hash)
        }
    }

    struct BrokenHasher;

    impl SecretHasher for BrokenHasher {
        fn hash(&self, _secret: &str) -> Result<CredentialHash, HashingError> {
            Err(HashingError("entropy source unavailable".to_string()))
        }

        fn verify(&self, _secret: &str, _hash: &CredentialHash) -> bool {
            false
        }
    }

    struct BrokenCodec;

    impl SessionCodec for BrokenCodec {
        fn encode(&self, _claims: &SessionClaims) -> Result<String, SigningError> {
            Err(SigningError("key rejected".to_string()))
        }

        fn decode(&self, _token: &str, _now: DateTime<Utc>) -> DomainResult<SessionClaims> {
            Err(DomainError::InvalidToken)
        }
    }

    fn verifier() -> (CredentialVerifier, Arc<MemoryIdentityStore>) {
        let store = Arc::new(MemoryIdentityStore::default());
        let v = CredentialVerifier::new(
            store.clone(),
            Arc::new(Argon2SecretHasher::with_cost(1024, 1).unwrap()),
            Arc::new(Hs256SessionCodec::new(b"test-secret")),
        );
        (v, store)
    }

    fn registration(identity: &str, secret: &str, role: Role) -> Registration {
        Registration {
            identity: identity.to_string(),
            secret: secret.to_string(),
            role,
            name: None,
        }
    }

    fn domain(err: ServiceError) -> DomainError {
        err.domain().cloned().expect("expected a domain error")
    }

    #[tokio::test]
    async fn register_then_authenticate_round_trips_identity_and_role() {
        let (v, _) = verifier();
        let user = v
            .register(registration("Owner@Example.com", "s3cret", Role::NgoOwner))
            .await
            .unwrap();
        assert_eq!(user.identity.as_str(), "owner@example.com");

        let session = v.authenticate("owner@example.com", "s3cret").await.unwrap();
        let principal = v.decode(&session.token).unwrap();
        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.identity, user.identity);
        assert_eq!(principal.role, Role::NgoOwner);
    }

    #[tokio::test]
    async fn duplicate_registration_leaves_first_user_untouched() {
        let (v, store) = verifier();
        let first = v.register(registration("a@example.com", "one", Role::Donor)).await.unwrap();

        let err = v
            .register(registration("A@EXAMPLE.COM", "two", Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(domain(err), DomainError::DuplicateIdentity);

        let identity = Identity::parse("a@example.com").unwrap();
        let stored = store.find_by_identity(&identity).await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.role, Role::Donor);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(v.authenticate("a@example.com", "one").await.is_ok());
        assert!(v.authenticate("a@example.com", "two").await.is_err());
    }

    #[tokio::test]
    async fn wrong_secret_and_unknown_identity_are_indistinguishable() {
        let (v, _) = verifier();
        v.register(registration("d@example.com", "pw", Role::Donor)).await.unwrap();

        let wrong = v.authenticate("d@example.com", "nope").await.unwrap_err();
        let unknown = v.authenticate("ghost@example.com", "pw").await.unwrap_err();
        let malformed = v.authenticate("ghost", "pw").await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert_eq!(unknown, malformed);
        assert_eq!(domain(wrong), DomainError::InvalidCredentials);
    }

    #[tokio::test]
    async fn session_expires_after_ttl() {
        let (v, _) = verifier();
        let v = v.with_ttl(Duration::hours(1));
        v.register(registration("e@example.com", "pw", Role::Admin)).await.unwrap();

        let now = Utc::now();
        let session = v.authenticate_at("e@example.com", "pw", now).await.unwrap();
        assert!(v.decode_at(&session.token, now + Duration::minutes(59)).is_ok());
        assert_eq!(
            v.decode_at(&session.token, now + Duration::hours(1)),
            Err(DomainError::ExpiredToken)
        );
    }

    #[tokio::test]
    async fn default_ttl_is_seven_days() {
        let (v, _) = verifier();
        v.register(registration("f@example.com", "pw", Role::Donor)).await.unwrap();
        let now = Utc::now();
        let session = v.authenticate_at("f@example.com", "pw", now).await.unwrap();
        assert_eq!(session.expires_at - now, Duration::days(7));
    }

    #[tokio::test]
    async fn unknown_identity_still_verifies_a_hash() {
        let hasher = Arc::new(RecordingHasher::new());
        let v = CredentialVerifier::new(
            Arc::new(MemoryIdentityStore::default()),
            hasher.clone(),
            Arc::new(Hs256SessionCodec::new(b"test-secret")),
        );
        v.register(registration("h@example.com", "pw", Role::Donor)).await.unwrap();

        for (identity, secret) in [("h@example.com", "wrong"), ("ghost@example.com", "pw"), ("ghost", "pw")] {
            hasher.reset();
            let err = v.authenticate(identity, secret).await.unwrap_err();
            assert_eq!(domain(err), DomainError::InvalidCredentials);
            assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1, "identity {identity}");
        }
    }

    #[tokio::test]
    async fn hashing_runs_off_the_async_worker() {
        let hasher = Arc::new(RecordingHasher::new());
        let v = CredentialVerifier::new(
            Arc::new(MemoryIdentityStore::default()),
            hasher.clone(),
            Arc::new(Hs256SessionCodec::new(b"test-secret")),
        );
        hasher.reset();

        v.register(registration("i@example.com", "pw", Role::Donor)).await.unwrap();
        v.authenticate("i@example.com", "pw").await.unwrap();

        let worker = thread::current().id();
        let threads = hasher.threads.lock().unwrap().clone();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|t| *t != worker));
    }

    #[tokio::test]
    async fn out_of_range_ttl_is_an_error_not_a_panic() {
        let (v, _) = verifier();
        let v = v.with_ttl(Duration::weeks(1_000_000_000));
        v.register(registration("j@example.com", "pw", Role::Donor)).await.unwrap();

        let err = v.authenticate("j@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "{err:?}");
    }

    #[tokio::test]
    async fn hashing_and_signing_faults_are_internal_errors() {
        let v = CredentialVerifier::new(
            Arc::new(MemoryIdentityStore::default()),
            Arc::new(BrokenHasher),
            Arc::new(Hs256SessionCodec::new(b"test-secret")),
        );
        let err = v.register(registration("k@example.com", "pw", Role::Donor)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "{err:?}");

        let store = Arc::new(MemoryIdentityStore::default());
        let hasher = Arc::new(Argon2SecretHasher::with_cost(1024, 1).unwrap());
        CredentialVerifier::new(store.clone(), hasher.clone(), Arc::new(Hs256SessionCodec::new(b"s")))
            .register(registration("l@example.com", "pw", Role::Donor))
            .await
            .unwrap();
        let v = CredentialVerifier::new(store, hasher, Arc::new(BrokenCodec));
        let err = v.authenticate("l@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "{err:?}");
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let (v, store) = verifier();
        let err = v.register(registration("not-an-email", "pw", Role::Donor)).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
        let err = v.register(registration("g@example.com", "", Role::Donor)).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            .. ProptestConfig::default()
        })]

        #[test]
        fn second_registration_always_fails(local in "[a-z]{1,12}", secret in "[ -~]{1,24}") {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let (v, store) = verifier();
                let identity = format!("{local}@example.org");
                v.register(registration(&identity, &secret, Role::Donor)).await.unwrap();
                let err = v.register(registration(&identity, "other", Role::Admin)).await.unwrap_err();
                assert_eq!(domain(err), DomainError::DuplicateIdentity);
                assert_eq!(store.count().await.unwrap(), 1);
            });
        }
    }
}
