//! External document shape and the mapping into it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::domain::entities::{Document, Entry, Group};

/// Externally visible document: the persistence shape minus internal notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProjection {
    pub id: i64,
    pub title: String,
    pub groups: Vec<GroupProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProjection {
    pub sort: i32,
    pub name: String,
    pub entries: Vec<EntryProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryProjection {
    pub key: String,
    pub value: String,
}

impl From<&Entry> for EntryProjection {
    fn from(entry: &Entry) -> Self {
        Self {
            key: entry.key.clone(),
            value: entry.value.clone(),
        }
    }
}

impl From<&Group> for GroupProjection {
    fn from(group: &Group) -> Self {
        Self {
            sort: group.sort,
            name: group.name.clone(),
            entries: group.entries.iter().map(EntryProjection::from).collect(),
        }
    }
}

impl From<&Document> for DocumentProjection {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            title: document.title.clone(),
            groups: document.groups.iter().map(GroupProjection::from).collect(),
        }
    }
}

/// Map a document to its external shape. Groups keep their input order.
pub fn project_document(document: &Document) -> DocumentProjection {
    DocumentProjection::from(document)
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("projection task was cancelled")]
    Cancelled(#[source] JoinError),
    #[error("no projection produced for item {index}")]
    Missing { index: usize },
}

/// Map a page of documents, one task per item.
///
/// Each task reports its input index and the result lands in that slot, so
/// the output order matches the input order whatever order the tasks finish in.
/// Either every item is projected or the whole page fails.
pub async fn project_all(
    documents: Vec<Document>,
) -> Result<Vec<DocumentProjection>, ProjectionError> {
    let len = documents.len();
    let mut tasks = JoinSet::new();

    for (index, document) in documents.into_iter().enumerate() {
        tasks.spawn(async move { (index, project_document(&document)) });
    }

    join_into_slots(tasks, len).await
}

async fn join_into_slots(
    mut tasks: JoinSet<(usize, DocumentProjection)>,
    len: usize,
) -> Result<Vec<DocumentProjection>, ProjectionError> {
    let mut slots: Vec<Option<DocumentProjection>> = vec![None; len];

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, projection)) => slots[index] = Some(projection),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => return Err(ProjectionError::Cancelled(err)),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(ProjectionError::Missing { index }))
        .collect()
}
