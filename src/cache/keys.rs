//! Cache key definitions.

/// Key under which the snapshot for document `id` is stored.
pub fn document_key(prefix: &str, id: i64) -> String {
    format!("{prefix}{id}")
}
