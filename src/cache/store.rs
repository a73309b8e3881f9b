//! Document snapshot cache.
//!
//! The cache mirrors projections the store has already returned. It never
//! originates a document and every entry is expendable: callers treat any
//! [`CacheError`] as a miss.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::projection::DocumentProjection;

use super::config::CacheConfig;
use super::keys::document_key;

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to encode snapshot: {0}")]
    Encode(String),
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Side cache for document projections, keyed by document id.
///
/// `get` distinguishes a clean miss (`Ok(None)`) from a failure (`Err`).
#[async_trait]
pub trait DocumentCache: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<DocumentProjection>, CacheError>;

    async fn set(&self, id: i64, projection: &DocumentProjection) -> Result<(), CacheError>;

    async fn delete(&self, id: i64) -> Result<(), CacheError>;
}

struct Snapshot {
    payload: Vec<u8>,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl Snapshot {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// In-process cache holding JSON snapshots with a fixed time-to-live.
///
/// Memory is bounded by an LRU of `capacity` entries.
pub struct MemoryDocumentCache {
    entries: RwLock<LruCache<String, Snapshot>>,
    ttl: Duration,
    prefix: String,
}

impl MemoryDocumentCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
            ttl: config.ttl,
            prefix: config.key_prefix_or_default().to_string(),
        }
    }

    /// Number of stored snapshots, expired ones included until touched.
    pub fn len(&self) -> usize {
        self.read_entries("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(&self, id: i64) -> String {
        document_key(&self.prefix, id)
    }

    fn lookup_at(&self, id: i64, now: Instant) -> Option<DocumentProjection> {
        let key = self.key(id);
        let mut entries = self.write_entries("get");

        let snapshot = entries.get(&key)?;
        if snapshot.is_expired(now) {
            entries.pop(&key);
            return None;
        }

        let decoded = serde_json::from_slice::<DocumentProjection>(&snapshot.payload);
        match decoded {
            Ok(projection) => Some(projection),
            Err(err) => {
                // A snapshot that no longer decodes is dropped and reported as a miss.
                warn!(
                    target = SOURCE,
                    key = %key,
                    error = %err,
                    "Discarding undecodable cache snapshot"
                );
                entries.pop(&key);
                None
            }
        }
    }

    fn store_at(
        &self,
        id: i64,
        projection: &DocumentProjection,
        now: Instant,
    ) -> Result<(), CacheError> {
        let payload =
            serde_json::to_vec(projection).map_err(|err| CacheError::Encode(err.to_string()))?;
        let key = self.key(id);
        let snapshot = Snapshot {
            payload,
            expires_at: now.checked_add(self.ttl),
        };

        let evicted = self.write_entries("set").push(key.clone(), snapshot);
        match evicted {
            Some((evicted_key, _)) if evicted_key != key => {
                debug!(target = SOURCE, key = %evicted_key, "Evicted cache snapshot");
                counter!("docservice_cache_evict_total").increment(1);
            }
            _ => {}
        }
        Ok(())
    }

    fn read_entries(&self, op: &'static str) -> RwLockReadGuard<'_, LruCache<String, Snapshot>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!(
                op,
                target_module = SOURCE,
                lock_kind = "rwlock.read",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        })
    }

    fn write_entries(
        &self,
        op: &'static str,
    ) -> RwLockWriteGuard<'_, LruCache<String, Snapshot>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!(
                op,
                target_module = SOURCE,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl DocumentCache for MemoryDocumentCache {
    async fn get(&self, id: i64) -> Result<Option<DocumentProjection>, CacheError> {
        Ok(self.lookup_at(id, Instant::now()))
    }

    async fn set(&self, id: i64, projection: &DocumentProjection) -> Result<(), CacheError> {
        self.store_at(id, projection, Instant::now())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        let key = self.key(id);
        self.write_entries("delete").pop(&key);
        Ok(())
    }
}

/// Cache used when caching is switched off: always misses, stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledDocumentCache;

#[async_trait]
impl DocumentCache for DisabledDocumentCache {
    async fn get(&self, _id: i64) -> Result<Option<DocumentProjection>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _id: i64, _projection: &DocumentProjection) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _id: i64) -> Result<(), CacheError> {
        Ok(())
    }
}
