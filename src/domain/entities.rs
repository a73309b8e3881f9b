use serde::{Deserialize, Serialize};

/// Identifier value carried by a document that has not been stored yet.
pub const UNASSIGNED_ID: i64 = 0;

/// Persistence shape of a document, including internal-only annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Group {
    pub sort: i32,
    pub name: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Entry {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub internal_note: String,
}

impl Document {
    pub fn is_assigned(&self) -> bool {
        self.id > UNASSIGNED_ID
    }
}
