use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Failures raised by the store gateways and the search orchestrator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Index missing: {0}")]
    IndexMissing(String),

    #[error("Query error: {0}")]
    QuerySyntax(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Stable machine-readable name, used in logs and failure markers
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidInput(_) => "invalid_input",
            StoreError::StoreUnavailable(_) => "store_unavailable",
            StoreError::IndexMissing(_) => "index_missing",
            StoreError::QuerySyntax(_) => "query_syntax",
            StoreError::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Store(StoreError::InvalidInput(msg)) => msg.clone(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "ok": false,
            "error": message
        }))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
