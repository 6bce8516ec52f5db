use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::FieldViolation;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Failure reported by a [`crate::db::Store`] backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{context}, {source}")]
    Backend {
        context: &'static str,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn backend(context: &'static str, source: impl Into<BoxError>) -> Self {
        StoreError::Backend {
            context,
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session has expired")]
    Expired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum VotingError {
    #[error("invalid session")]
    InvalidSession,

    #[error("no votes found for product {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("invalid session")]
    InvalidSession,

    #[error("malformed payload")]
    MalformedPayload,

    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Bad Request")]
    BadRequest,

    #[error("{0}")]
    NotFound(String),

    #[error("session could not be created")]
    SessionNotCreated,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<VotingError> for AppError {
    fn from(err: VotingError) -> Self {
        match err {
            VotingError::InvalidSession => AppError::InvalidSession,
            VotingError::NotFound(product_id) => {
                AppError::NotFound(format!("no votes found for product {product_id}"))
            }
            VotingError::Store(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized | AppError::InvalidSession => StatusCode::UNAUTHORIZED,
            AppError::MalformedPayload | AppError::Validation(_) | AppError::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SessionNotCreated | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        match self {
            // Violations go back as a bare list, not wrapped in {"error": ..}
            AppError::Validation(violations) => (status, Json(violations)).into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
