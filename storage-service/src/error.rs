use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StoreError;

/// Client-fixable request problems; always answered with 400
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file selected")]
    MissingFile,

    #[error("File exceeds the size limit ({})", describe_size(*limit))]
    TooLarge { limit: u64 },

    #[error("Unsupported file type. Allowed types: {}", allowed.join(", "))]
    BadExtension { allowed: Vec<String> },

    #[error("Invalid bucket name '{0}': use lowercase letters, digits, hyphens and dots, starting and ending with a letter or digit")]
    BadBucketName(String),

    #[error("Bucket \"{0}\" already exists")]
    BucketExists(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl ValidationError {
    /// Stable identifier for the rejection reason
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingFile => "missing-file",
            ValidationError::TooLarge { .. } => "too-large",
            ValidationError::BadExtension { .. } => "bad-extension",
            ValidationError::BadBucketName(_) => "bad-name",
            ValidationError::BucketExists(_) => "exists",
            ValidationError::MalformedRequest(_) => "malformed-request",
        }
    }
}

fn describe_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Errors surfaced by the gateway components
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Storage(String),

    #[error("Could not find a free object name for '{filename}' after {attempts} attempts")]
    NamingExhausted { filename: String, attempts: u32 },

    #[error("Object store client is not initialized")]
    StoreUnavailable,
}

impl ServiceError {
    /// Wrap a store failure with the operation that hit it
    pub fn storage(action: &str, err: StoreError) -> Self {
        ServiceError::Storage(format!("{}: {}", action, err))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_)
            | ServiceError::NamingExhausted { .. }
            | ServiceError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
