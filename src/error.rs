use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::index::IndexError;

/// The primary error type for request handling.
///
/// Every variant is terminal for the request that produced it; none of them
/// affects other in-flight requests or the listener.
#[derive(Debug)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
    /// For when the credential header is missing, malformed or wrong.
    Unauthorized {
        /// Realm advertised in the `WWW-Authenticate` challenge.
        realm: String,
    },
    /// For when a requested file or shortcut does not exist.
    NotFound(String),
    /// For a request path that would resolve outside the served root.
    ///
    /// Rendered exactly like `NotFound` so probing cannot tell the two apart.
    TraversalRejected(String),
    /// For a `/drop/` segment that is not a bare filename.
    BadShortcut(String),
    /// For when user input is invalid.
    InvalidInput(String),
    /// For errors related to I/O operations.
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::Unauthorized { .. } => write!(f, "Unauthorized: authentication required"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::TraversalRejected(path) => write!(f, "Traversal rejected: {}", path),
            AppError::BadShortcut(msg) => write!(f, "Bad shortcut: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut challenge = None;
        let (status, error_code, error_message, details) = match self {
            AppError::Internal(e) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::Unauthorized { realm } => {
                challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)).ok();
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Authentication required".to_string(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::TraversalRejected(path) => {
                tracing::warn!(path = %path, "path traversal attempt rejected");
                (StatusCode::NOT_FOUND, "NOT_FOUND", not_found_message(&path), None)
            }
            AppError::BadShortcut(msg) => (StatusCode::BAD_REQUEST, "BAD_SHORTCUT", msg, None),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg, None),
            AppError::IoError(msg) => {
                tracing::error!("I/O error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "An I/O error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            let value = challenge.unwrap_or(HeaderValue::from_static("Basic realm=\"Dropper\""));
            response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

/// Message used for every 404, whether the path is missing or was rejected.
pub fn not_found_message(path: &str) -> String {
    format!("{} not found", path)
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound("resource not found".to_string()),
            kind => AppError::IoError(format!("{}: {}", kind, err)),
        }
    }
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        AppError::Internal(err.into())
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the request handlers.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that provides a convenient way to convert
/// an `Option` to a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    /// Converts `None` into `AppError::NotFound` naming `entity`.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(not_found_message(entity)))
    }
}
