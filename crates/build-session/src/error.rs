//! Error types for build controller operations.

use std::time::Duration;

use build_client::{ClientError, ConfigError};
use thiserror::Error;

/// Errors that can occur while driving a build.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The backend call failed.
    #[error("backend error: {0}")]
    Client(#[from] ClientError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An operation needed a session but no build has started.
    #[error("no build session has been started")]
    NoSession,

    /// The user submitted an empty message.
    #[error("message is empty")]
    EmptyMessage,

    /// Agent chat was requested before the build produced an agent id.
    #[error("agent id not found; finish the build before chatting")]
    MissingAgentId,

    /// Approval was given while no configuration was proposed.
    #[error("no configuration is awaiting approval")]
    NotAwaitingApproval,

    /// Database credentials were incomplete or unreadable.
    #[error("invalid database credentials: {0}")]
    InvalidCredentials(String),

    /// The backend did not answer in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The controller was shut down while a call was in flight.
    #[error("operation cancelled")]
    Cancelled,
}

impl ControllerError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ControllerError::Client(e) => e.user_message(),
            ControllerError::Timeout(_) => {
                "The build service took too long to respond. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
