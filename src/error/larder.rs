use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LarderError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The acting person lacks the owner (or self) relationship required for a mutation.
    ///
    /// Distinct inside the crate, but rendered exactly like [`LarderError::NotFound`] so
    /// callers cannot probe which resources exist.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl LarderError {
    /// Map a unique-constraint violation to [`LarderError::Conflict`], passing other errors through.
    pub(crate) fn from_unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => LarderError::Conflict(what()),
            _ => LarderError::DatabaseError(err),
        }
    }
}

impl IntoResponse for LarderError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            LarderError::NotFound(_) | LarderError::Forbidden(_) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: "The requested resource could not be found.".to_string(),
                };
                (status, body)
            }

            LarderError::Validation(message) => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let body = ApiErrorObject {
                    code: "VALIDATION_FAILED".to_string(),
                    message,
                };
                (status, body)
            }

            LarderError::Conflict(message) => {
                let status = StatusCode::CONFLICT;
                let body = ApiErrorObject {
                    code: "CONFLICT".to_string(),
                    message,
                };
                (status, body)
            }

            LarderError::DatabaseError(_)
            | LarderError::RactorError(_)
            | LarderError::UnexpectedError(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
