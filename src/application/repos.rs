//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Document;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// One page of documents plus the total number stored.
#[derive(Debug, Clone, Default)]
pub struct DocumentPage {
    pub items: Vec<Document>,
    pub total: u64,
}

/// Authoritative document storage.
///
/// Implementations make no promise about the order of nested groups; callers
/// normalize what they read.
#[async_trait]
pub trait DocumentsRepo: Send + Sync {
    /// Insert a document, ignoring its `id`; returns it with the assigned id.
    async fn insert_document(&self, document: &Document) -> Result<Document, RepoError>;

    /// Replace the record addressed by `document.id`.
    ///
    /// Returns [`RepoError::NotFound`] when no such record exists.
    async fn update_document(&self, document: &Document) -> Result<(), RepoError>;

    /// Returns [`RepoError::NotFound`] when no such record exists.
    async fn delete_document(&self, id: i64) -> Result<(), RepoError>;

    async fn find_document(&self, id: i64) -> Result<Option<Document>, RepoError>;

    async fn list_documents(&self, limit: u32, offset: u32) -> Result<DocumentPage, RepoError>;
}
