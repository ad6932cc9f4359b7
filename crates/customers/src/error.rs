//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. The status code and the
//! client-facing body are decided in one place, [`AppError::status_code`] and
//! the `IntoResponse` impl, so handlers never pick statuses themselves.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;

/// Request-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A single-resource lookup matched no rows.
    #[error("Not found")]
    NotFound,

    /// Any database failure while serving a request. `action` is the only
    /// part shown to the client.
    #[error("{action}: {source}")]
    QueryFailure {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// The request could not be extracted (bad path segment, malformed JSON).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// Build a mapper that tags a repository error with the failed action.
    ///
    /// ```rust,ignore
    /// repo.list().await.map_err(AppError::query("Failed to fetch customers"))?;
    /// ```
    pub fn query(action: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| Self::QueryFailure { action, source }
    }

    /// Map an error kind to its HTTP status.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::QueryFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message sent to the client. Never includes database detail.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::NotFound => "Not found".to_string(),
            Self::QueryFailure { action, .. } => (*action).to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::QueryFailure { .. }) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// Extractor detail (serde positions, expected types) goes to the log only.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::BadRequest("Invalid JSON body".to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameter");
        Self::BadRequest("Invalid id".to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Fatal errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unable to connect to DB after {attempts} attempts")]
    DatabaseUnreachable { attempts: u32 },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
