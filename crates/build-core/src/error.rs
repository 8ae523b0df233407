//! Error types for build-core.

use thiserror::Error;

/// Errors raised while interpreting backend or URL values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Provider name is not one the backend authorizes.
    #[error("unknown OAuth provider: {0}")]
    UnknownProvider(String),

    /// `auth` query parameter had an unexpected value.
    #[error("invalid auth outcome: {0}")]
    InvalidAuthOutcome(String),
}
