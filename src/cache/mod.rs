//! Document snapshot cache.
//!
//! A side cache for point reads. It holds serialized projections keyed by
//! document id, expires them after a fixed TTL, and has no read-through of its
//! own: population and invalidation are driven by
//! [`DocumentService`](crate::application::documents::DocumentService).
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 900
//! key_prefix = "doc:"
//! capacity = 10000
//! ```

mod config;
mod keys;
mod store;

use std::sync::Arc;

pub use config::CacheConfig;
pub use keys::document_key;
pub use store::{CacheError, DisabledDocumentCache, DocumentCache, MemoryDocumentCache};

/// Build the cache backend selected by `config`.
pub fn build_document_cache(config: &CacheConfig) -> Arc<dyn DocumentCache> {
    if config.enabled {
        Arc::new(MemoryDocumentCache::new(config))
    } else {
        Arc::new(DisabledDocumentCache)
    }
}
