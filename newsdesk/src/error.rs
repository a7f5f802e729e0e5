use rocket::http::Status;
use serde::Serialize;
use thiserror::Error;

/// Failures reachable through the store and the desk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("validation failed: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn cluster_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: "cluster",
            id,
        }
    }

    pub fn news_not_found(id: u64) -> Self {
        Self::NotFound { entity: "news", id }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::Validation,
        }
    }

    /// HTTP status both front ends answer with.
    pub fn status(&self) -> Status {
        match self {
            Self::NotFound { .. } => Status::NotFound,
            Self::Validation(_) => Status::BadRequest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
}

/// JSON error body returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&StoreError> for ErrorBody {
    fn from(err: &StoreError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
