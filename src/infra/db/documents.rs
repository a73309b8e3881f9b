use async_trait::async_trait;
use sqlx::types::Json;

use crate::{
    application::repos::{DocumentPage, DocumentsRepo, RepoError},
    domain::entities::{Document, Group},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    internal_note: String,
    groups: Json<Vec<Group>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            internal_note: row.internal_note,
            groups: row.groups.0,
        }
    }
}

#[async_trait]
impl DocumentsRepo for PostgresRepositories {
    async fn insert_document(&self, document: &Document) -> Result<Document, RepoError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (title, internal_note, groups)
            VALUES ($1, $2, $3)
            RETURNING id, title, internal_note, groups
            "#,
        )
        .bind(&document.title)
        .bind(&document.internal_note)
        .bind(Json(&document.groups))
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(Document::from(row))
    }

    async fn update_document(&self, document: &Document) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET title = $2, internal_note = $3, groups = $4
            WHERE id = $1
            "#,
        )
        .bind(document.id)
        .bind(&document.title)
        .bind(&document.internal_note)
        .bind(Json(&document.groups))
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_document(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_document(&self, id: i64) -> Result<Option<Document>, RepoError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, internal_note, groups
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Document::from))
    }

    async fn list_documents(&self, limit: u32, offset: u32) -> Result<DocumentPage, RepoError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, internal_note, groups
            FROM documents
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(DocumentPage {
            items: rows.into_iter().map(Document::from).collect(),
            total: Self::convert_count(total)?,
        })
    }
}
