//! Sync error taxonomy and the `{ data, error, details }` envelope.

use serde::Serialize;

/// Error returned by every sync operation.
///
/// Transport failures (`Network`, `Http`, `Decode`, `Cancelled`) mean the round trip itself
/// went wrong. `Rejected` is a 200-level response whose payload reports failure.
/// `InvalidInput` is raised locally and never reaches the backend.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Network error: {details}")]
    Network { details: String },
    #[error("{error}")]
    Http {
        status: u16,
        error: String,
        details: Option<String>,
    },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl SyncError {
    pub(crate) fn network(err: impl std::fmt::Display) -> Self {
        Self::Network {
            details: err.to_string(),
        }
    }

    /// Short error label, as surfaced in the `error` field of the envelope.
    pub fn error(&self) -> String {
        match self {
            Self::Network { .. } => "Network error".to_string(),
            Self::Http { error, .. } => error.clone(),
            Self::Decode(_) => "Unexpected response".to_string(),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::Rejected(msg) | Self::InvalidInput(msg) => msg.clone(),
        }
    }

    /// Optional detail text, as surfaced in the `details` field of the envelope.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Network { details } => Some(details),
            Self::Http { details, .. } => details.as_deref(),
            Self::Decode(details) => Some(details),
            _ => None,
        }
    }

    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures of the round trip itself (as opposed to rejections and local checks).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Http { .. } | Self::Decode(_) | Self::Cancelled
        )
    }
}

/// Uniform result envelope: exactly one of `data` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<Result<T, SyncError>> for ApiResponse<T> {
    fn from(result: Result<T, SyncError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self {
                data: None,
                error: Some(e.error()),
                details: e.details().map(str::to_string),
            },
        }
    }
}
