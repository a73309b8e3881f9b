use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::documents::DocumentServiceError;
use crate::application::pagination::OffsetPage;
use crate::application::projection::{project_all, project_document};
use crate::application::repos::RepoError;

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

/// Response header reporting whether a point read was served from the cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

pub async fn list_documents(
    State(state): State<ApiState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = OffsetPage::parse(query.limit.as_deref(), query.offset.as_deref())
        .map_err(|err| ApiError::invalid_pagination(err.to_string()))?;

    let listing = state
        .documents
        .list(page.limit, page.offset)
        .await
        .map_err(document_to_api)?;

    let items = project_all(listing.items)
        .await
        .map_err(|err| ApiError::projection_failed(err.to_string()))?;

    Ok(Json(DocumentListResponse {
        items,
        total: listing.total,
        limit: listing.limit,
        offset: listing.offset,
    }))
}

pub async fn create_document(
    State(state): State<ApiState>,
    payload: Result<Json<DocumentCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(json_to_api)?;

    let created = state
        .documents
        .create(payload.into_document())
        .await
        .map_err(document_to_api)?;

    Ok((StatusCode::CREATED, Json(project_document(&created))))
}

pub async fn get_document(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(path_to_api)?;

    let lookup = state
        .documents
        .get_projection(id)
        .await
        .map_err(document_to_api)?;

    Ok((
        [(CACHE_STATUS_HEADER, lookup.source.as_str())],
        Json(lookup.projection),
    ))
}

pub async fn update_document(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DocumentUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(path_to_api)?;
    let Json(payload) = payload.map_err(json_to_api)?;

    state
        .documents
        .update(payload.into_document(id))
        .await
        .map_err(document_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_document(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(path_to_api)?;

    state
        .documents
        .delete(id)
        .await
        .map_err(document_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::document_not_found(None),
        RepoError::InvalidInput { message } => ApiError::invalid_input(message),
        RepoError::Timeout => ApiError::store_timeout(),
        RepoError::Persistence(msg) => ApiError::store_failure(msg),
    }
}

pub(crate) fn document_to_api(err: DocumentServiceError) -> ApiError {
    match err {
        DocumentServiceError::NotFound { id } => ApiError::document_not_found(Some(id)),
        DocumentServiceError::InvalidIdentifier(id) => {
            ApiError::invalid_document_id(format!("id must be positive, got {id}"))
        }
        DocumentServiceError::Repo(repo) => repo_to_api(repo),
    }
}

fn json_to_api(rejection: JsonRejection) -> ApiError {
    ApiError::invalid_body(rejection.body_text())
}

fn path_to_api(rejection: PathRejection) -> ApiError {
    ApiError::invalid_document_id(rejection.body_text())
}
