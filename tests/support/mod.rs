#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use docservice::application::documents::DocumentService;
use docservice::application::projection::DocumentProjection;
use docservice::application::repos::{DocumentPage, DocumentsRepo, RepoError};
use docservice::cache::{CacheConfig, CacheError, DocumentCache, MemoryDocumentCache};
use docservice::domain::entities::{Document, Entry, Group};

#[derive(Default)]
struct StoreState {
    next_id: i64,
    documents: BTreeMap<i64, Document>,
}

/// Store double keeping documents exactly as written, group order included.
#[derive(Default)]
pub struct InMemoryDocumentsRepo {
    state: Mutex<StoreState>,
    find_calls: AtomicUsize,
}

impl InMemoryDocumentsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own id, bypassing normalization.
    pub async fn seed(&self, document: Document) {
        let mut state = self.state.lock().await;
        state.next_id = state.next_id.max(document.id);
        state.documents.insert(document.id, document);
    }

    pub async fn stored(&self, id: i64) -> Option<Document> {
        self.state.lock().await.documents.get(&id).cloned()
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentsRepo for InMemoryDocumentsRepo {
    async fn insert_document(&self, document: &Document) -> Result<Document, RepoError> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let mut stored = document.clone();
        stored.id = state.next_id;
        state.documents.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_document(&self, document: &Document) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        match state.documents.get_mut(&document.id) {
            Some(existing) => {
                *existing = document.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete_document(&self, id: i64) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        state
            .documents
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn find_document(&self, id: i64) -> Result<Option<Document>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().await.documents.get(&id).cloned())
    }

    async fn list_documents(&self, limit: u32, offset: u32) -> Result<DocumentPage, RepoError> {
        let state = self.state.lock().await;
        let items = state
            .documents
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(DocumentPage {
            items,
            total: state.documents.len() as u64,
        })
    }
}

/// Store double whose every call times out.
pub struct UnavailableDocumentsRepo;

#[async_trait]
impl DocumentsRepo for UnavailableDocumentsRepo {
    async fn insert_document(&self, _document: &Document) -> Result<Document, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn update_document(&self, _document: &Document) -> Result<(), RepoError> {
        Err(RepoError::Timeout)
    }

    async fn delete_document(&self, _id: i64) -> Result<(), RepoError> {
        Err(RepoError::Timeout)
    }

    async fn find_document(&self, _id: i64) -> Result<Option<Document>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn list_documents(&self, _limit: u32, _offset: u32) -> Result<DocumentPage, RepoError> {
        Err(RepoError::Timeout)
    }
}

/// Cache double that fails every operation.
#[derive(Default)]
pub struct FailingCache {
    calls: AtomicUsize,
}

impl FailingCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::Unavailable("connection refused".into())
    }
}

#[async_trait]
impl DocumentCache for FailingCache {
    async fn get(&self, _id: i64) -> Result<Option<DocumentProjection>, CacheError> {
        Err(self.fail())
    }

    async fn set(&self, _id: i64, _projection: &DocumentProjection) -> Result<(), CacheError> {
        Err(self.fail())
    }

    async fn delete(&self, _id: i64) -> Result<(), CacheError> {
        Err(self.fail())
    }
}

pub fn memory_cache() -> Arc<MemoryDocumentCache> {
    Arc::new(MemoryDocumentCache::new(&CacheConfig::default()))
}

pub fn service_with(
    store: Arc<dyn DocumentsRepo>,
    cache: Arc<dyn DocumentCache>,
) -> DocumentService {
    DocumentService::new(store, cache)
}

pub fn group(sort: i32, name: &str) -> Group {
    Group {
        sort,
        name: name.to_string(),
        internal_note: format!("note for {name}"),
        entries: vec![Entry {
            key: format!("{name}-key"),
            value: format!("{name}-value"),
            internal_note: "secret".to_string(),
        }],
    }
}

pub fn document(title: &str, groups: Vec<Group>) -> Document {
    Document {
        id: 0,
        title: title.to_string(),
        internal_note: "internal".to_string(),
        groups,
    }
}

pub fn group_names(groups: &[impl HasName]) -> Vec<&str> {
    groups.iter().map(HasName::name).collect()
}

pub trait HasName {
    fn name(&self) -> &str;
}

impl HasName for Group {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasName for docservice::application::projection::GroupProjection {
    fn name(&self) -> &str {
        &self.name
    }
}
