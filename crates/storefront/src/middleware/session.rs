//! Session middleware configuration.
//!
//! Sessions hold per-visitor navigation state only (the incentive counter
//! and the ad-click landing page). Records live in a bounded `moka` cache:
//! each one is dropped at its own expiry date, and the least valuable ones
//! are evicted once `SESSION_MAX_ENTRIES` is reached. A restart starts every
//! visitor on a fresh offer sequence.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry as SessionExpiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "qb_session";

/// Session expiry time in seconds (1 day of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// In-memory session store with a hard entry bound.
#[derive(Clone)]
pub struct BoundedSessionStore {
    records: Cache<Id, Record>,
}

impl BoundedSessionStore {
    /// Store holding at most roughly `max_sessions` live records.
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(RecordExpiry)
                .build(),
        }
    }

    /// Number of records currently held, including ones awaiting eviction.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.records.entry_count()
    }

    /// Apply pending evictions and expirations.
    pub async fn run_pending_tasks(&self) {
        self.records.run_pending_tasks().await;
    }
}

impl fmt::Debug for BoundedSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedSessionStore")
            .field("entries", &self.records.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for BoundedSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Expires each cached record at the record's own expiry date.
struct RecordExpiry;

impl RecordExpiry {
    fn time_left(record: &Record) -> Duration {
        let left = record.expiry_date - OffsetDateTime::now_utc();
        Duration::try_from(left).unwrap_or(Duration::ZERO)
    }
}

impl Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _id: &Id,
        record: &Record,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Self::time_left(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::time_left(record))
    }
}

/// Create the session layer backed by a [`BoundedSessionStore`].
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<BoundedSessionStore> {
    session_layer(
        BoundedSessionStore::new(config.max_sessions),
        config.secure_cookies(),
    )
}

fn session_layer(
    store: BoundedSessionStore,
    secure: bool,
) -> SessionManagerLayer<BoundedSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(SessionExpiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
