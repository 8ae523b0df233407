//! Error types for build-client.

use thiserror::Error;

/// Errors that can occur when talking to the build backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Creating a build session returned a non-success status.
    #[error("failed to start build session (HTTP {status}): {body}")]
    SessionCreate { status: u16, body: String },

    /// Continuing a build session returned a non-success status.
    #[error("failed to continue build session (HTTP {status}): {body}")]
    SessionContinue { status: u16, body: String },

    /// Uploading a file returned a non-success status.
    #[error("failed to upload file (HTTP {status}): {body}")]
    Upload { status: u16, body: String },

    /// Any other endpoint returned a non-success status.
    #[error("{endpoint} failed (HTTP {status}): {body}")]
    Api {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The auth endpoint answered without an authorization URL.
    #[error("no auth_url returned for provider {0}")]
    MissingAuthUrl(String),
}

impl ClientError {
    /// HTTP status of a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionCreate { status, .. }
            | Self::SessionContinue { status, .. }
            | Self::Upload { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The backend's `detail` message, when the error body carries one.
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            Self::SessionCreate { body, .. }
            | Self::SessionContinue { body, .. }
            | Self::Upload { body, .. }
            | Self::Api { body, .. } => body,
            _ => return None,
        };

        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.detail().unwrap_or_else(|| self.to_string())
    }
}
