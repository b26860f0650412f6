//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scrubber_core::Error;
use scrubber_engine::ScanError;
use serde::Serialize;
use tracing::{error, warn};

/// Error body returned by every route: `{"error": ..., "path": ...}`.
///
/// `path` is the JSON Pointer of the scalar that stopped a document scan
/// and is omitted otherwise.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub path: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            path: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::Config(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Detection(_) | Error::Transformation(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ScanError> for ApiError {
    fn from(e: ScanError) -> Self {
        let status = match &e {
            ScanError::EmptyDocument => StatusCode::BAD_REQUEST,
            ScanError::Detection { .. } | ScanError::Transformation { .. } => StatusCode::BAD_GATEWAY,
            ScanError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            path: e.path().map(|p| p.to_string()),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.message);
        } else {
            warn!("{} {}", self.status, self.message);
        }
        let body = Json(ErrorBody {
            error: self.message,
            path: self.path,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubber_engine::NodePath;

    #[test]
    fn test_store_error_status() {
        assert_eq!(ApiError::from(Error::NotFound("x".into())).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(Error::AlreadyExists("x".into())).status, StatusCode::CONFLICT);
        assert_eq!(ApiError::from(Error::Config("x".into())).status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(Error::Storage("x".into())).status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_scan_error_status_and_path() {
        let empty = ApiError::from(ScanError::EmptyDocument);
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert!(empty.path.is_none());

        let failed = ApiError::from(ScanError::Detection {
            path: NodePath::root().key("notes").index(0),
            source: Error::Detection("down".into()),
        });
        assert_eq!(failed.status, StatusCode::BAD_GATEWAY);
        assert_eq!(failed.path.as_deref(), Some("/notes/0"));

        let cancelled = ApiError::from(ScanError::Cancelled { path: NodePath::root().key("a") });
        assert_eq!(cancelled.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
