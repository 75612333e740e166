//! Session store for in-flight OAuth flows.
//!
//! Every sign-in start creates a flow session before the user has proven anything, so
//! the store must stay bounded. Records live in a `moka` cache capped at
//! `AUTH_FLOW_CAPACITY` entries, and each one is dropped after
//! [`PENDING_TTL_SECS`](super::oauth::PENDING_TTL_SECS) whether or not its callback
//! ever arrives.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

/// Bounded, time-limited `tower-sessions` store.
#[derive(Debug, Clone)]
pub struct FlowStore {
    cache: Cache<Id, Record>,
}

impl FlowStore {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    /// Number of stored flows after pending evictions have run.
    pub async fn flow_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl SessionStore for FlowStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}
