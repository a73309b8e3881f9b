//! Cache-aside orchestration over the document store and the snapshot cache.
//!
//! Writes go to the store and invalidate the cache entry; they never refresh
//! it. Reads try the cache, fall back to the store, and repopulate the cache on
//! the way out. The cache is advisory: a failing cache turns into a miss or a
//! no-op and never changes the outcome of an operation.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::projection::{DocumentProjection, project_document};
use crate::application::repos::{DocumentsRepo, RepoError};
use crate::cache::{CacheError, DocumentCache};
use crate::domain::entities::{Document, UNASSIGNED_ID};
use crate::domain::normalize::{normalize_document, normalize_documents};

const SOURCE: &str = "application::documents";

#[derive(Debug, Error)]
pub enum DocumentServiceError {
    #[error("document {id} not found")]
    NotFound { id: i64 },
    #[error("invalid document identifier `{0}`")]
    InvalidIdentifier(i64),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Where a point read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Cache,
    Store,
}

impl LookupSource {
    pub fn is_cache_hit(self) -> bool {
        matches!(self, LookupSource::Cache)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LookupSource::Cache => "HIT",
            LookupSource::Store => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentLookup {
    pub projection: DocumentProjection,
    pub source: LookupSource,
}

#[derive(Debug, Clone)]
pub struct DocumentListing {
    pub items: Vec<Document>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentsRepo>,
    cache: Arc<dyn DocumentCache>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentsRepo>, cache: Arc<dyn DocumentCache>) -> Self {
        Self { store, cache }
    }

    /// Store a new document. The store assigns the identifier; the cache is
    /// left alone until the first read.
    pub async fn create(&self, mut document: Document) -> Result<Document, DocumentServiceError> {
        document.id = UNASSIGNED_ID;
        normalize_document(&mut document);

        let created = self.store.insert_document(&document).await?;
        debug!(target = SOURCE, id = created.id, "Document created");
        Ok(created)
    }

    pub async fn get_projection(&self, id: i64) -> Result<DocumentLookup, DocumentServiceError> {
        match self.cache.get(id).await {
            Ok(Some(projection)) => {
                counter!("docservice_cache_hit_total").increment(1);
                return Ok(DocumentLookup {
                    projection,
                    source: LookupSource::Cache,
                });
            }
            Ok(None) => {}
            Err(err) => record_degraded("get", id, &err),
        }
        counter!("docservice_cache_miss_total").increment(1);

        let mut document = self
            .store
            .find_document(id)
            .await?
            .ok_or(DocumentServiceError::NotFound { id })?;

        normalize_document(&mut document);
        let projection = project_document(&document);

        if let Err(err) = self.cache.set(id, &projection).await {
            record_degraded("set", id, &err);
        }

        Ok(DocumentLookup {
            projection,
            source: LookupSource::Store,
        })
    }

    /// Replace the document addressed by `document.id`.
    pub async fn update(&self, mut document: Document) -> Result<(), DocumentServiceError> {
        if !document.is_assigned() {
            return Err(DocumentServiceError::InvalidIdentifier(document.id));
        }
        let id = document.id;

        normalize_document(&mut document);
        self.store
            .update_document(&document)
            .await
            .map_err(|err| not_found_for(id, err))?;

        self.invalidate(id).await;
        debug!(target = SOURCE, id, "Document updated");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DocumentServiceError> {
        self.store
            .delete_document(id)
            .await
            .map_err(|err| not_found_for(id, err))?;

        self.invalidate(id).await;
        debug!(target = SOURCE, id, "Document deleted");
        Ok(())
    }

    /// A page of documents with groups in canonical order. Lists bypass the cache.
    pub async fn list(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<DocumentListing, DocumentServiceError> {
        let page = self.store.list_documents(limit, offset).await?;
        let mut items = page.items;
        normalize_documents(&mut items);

        Ok(DocumentListing {
            items,
            total: page.total,
            limit,
            offset,
        })
    }

    async fn invalidate(&self, id: i64) {
        if let Err(err) = self.cache.delete(id).await {
            record_degraded("delete", id, &err);
        }
    }
}

fn not_found_for(id: i64, err: RepoError) -> DocumentServiceError {
    match err {
        RepoError::NotFound => DocumentServiceError::NotFound { id },
        other => DocumentServiceError::Repo(other),
    }
}

fn record_degraded(op: &'static str, id: i64, err: &CacheError) {
    warn!(
        target = SOURCE,
        op,
        id,
        error = %err,
        "Cache degraded; continuing without it"
    );
    counter!("docservice_cache_degraded_total", "op" => op).increment(1);
}
