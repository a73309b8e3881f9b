//! JSON error envelope for the document API: `{"error": {code, message, hint}}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;

/// Machine-readable error codes carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    InvalidInput,
    StoreTimeout,
    StoreFailure,
    ProjectionFailure,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::StoreTimeout => "db_timeout",
            Self::StoreFailure => "repo_error",
            Self::ProjectionFailure => "projection_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

/// A failed document request, rendered as the JSON envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    fn rejected(message: &'static str, hint: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::BadRequest,
            message,
            hint: Some(hint),
        }
    }

    pub fn invalid_body(hint: String) -> Self {
        Self::rejected("invalid request body", hint)
    }

    pub fn invalid_pagination(hint: String) -> Self {
        Self::rejected("invalid pagination", hint)
    }

    pub fn invalid_document_id(hint: String) -> Self {
        Self::rejected("invalid document id", hint)
    }

    pub fn invalid_input(detail: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::InvalidInput,
            message: "invalid input",
            hint: Some(detail),
        }
    }

    pub fn document_not_found(id: Option<i64>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: ErrorCode::NotFound,
            message: "document not found",
            hint: id.map(|id| format!("no document with id {id}")),
        }
    }

    pub fn store_timeout() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: ErrorCode::StoreTimeout,
            message: "database timeout",
            hint: None,
        }
    }

    pub fn store_failure(detail: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: ErrorCode::StoreFailure,
            message: "persistence error",
            hint: Some(detail),
        }
    }

    pub fn projection_failed(detail: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: ErrorCode::ProjectionFailure,
            message: "failed to build the document page",
            hint: Some(detail),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code.as_str();
        let summary = format!(
            "{code}: {}",
            self.hint.as_deref().unwrap_or(self.message)
        );
        let envelope = ErrorEnvelope {
            error: ErrorDetail {
                code,
                message: self.message,
                hint: self.hint,
            },
        };

        let mut response = (self.status, Json(envelope)).into_response();
        ErrorReport::from_message("infra::http::api", self.status, summary).attach(&mut response);
        response
    }
}
