use serde::{Deserialize, Serialize};

use crate::application::projection::DocumentProjection;
use crate::domain::entities::{Document, Entry, Group, UNASSIGNED_ID};

/// Body of `POST /documents`. Unknown fields are rejected at every level.
///
/// A client-supplied `id` is accepted and discarded.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentCreateRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub groups: Vec<GroupPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupPayload {
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub entries: Vec<EntryPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryPayload {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub internal_note: String,
}

impl From<EntryPayload> for Entry {
    fn from(payload: EntryPayload) -> Self {
        Self {
            key: payload.key,
            value: payload.value,
            internal_note: payload.internal_note,
        }
    }
}

impl From<GroupPayload> for Group {
    fn from(payload: GroupPayload) -> Self {
        Self {
            sort: payload.sort,
            name: payload.name,
            internal_note: payload.internal_note,
            entries: payload.entries.into_iter().map(Entry::from).collect(),
        }
    }
}

impl DocumentCreateRequest {
    pub fn into_document(self) -> Document {
        Document {
            id: UNASSIGNED_ID,
            title: self.title,
            internal_note: self.internal_note,
            groups: self.groups.into_iter().map(Group::from).collect(),
        }
    }
}

/// Body of `PUT /documents/{id}`. Unknown fields are ignored and the path id
/// wins over any id in the body.
#[derive(Debug, Deserialize)]
pub struct DocumentUpdateRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub groups: Vec<GroupUpdatePayload>,
}

/// Group inside an update body: missing fields default as on create.
#[derive(Debug, Deserialize)]
pub struct GroupUpdatePayload {
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub entries: Vec<EntryUpdatePayload>,
}

#[derive(Debug, Deserialize)]
pub struct EntryUpdatePayload {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub internal_note: String,
}

impl From<EntryUpdatePayload> for Entry {
    fn from(payload: EntryUpdatePayload) -> Self {
        Self {
            key: payload.key,
            value: payload.value,
            internal_note: payload.internal_note,
        }
    }
}

impl From<GroupUpdatePayload> for Group {
    fn from(payload: GroupUpdatePayload) -> Self {
        Self {
            sort: payload.sort,
            name: payload.name,
            internal_note: payload.internal_note,
            entries: payload.entries.into_iter().map(Entry::from).collect(),
        }
    }
}

impl DocumentUpdateRequest {
    pub fn into_document(self, id: i64) -> Document {
        Document {
            id,
            title: self.title,
            internal_note: self.internal_note,
            groups: self.groups.into_iter().map(Group::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub items: Vec<DocumentProjection>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}
