//! HTTP client for the agent build backend.
//!
//! This crate wraps the backend's HTTP contracts:
//!
//! - Build sessions: create, continue, upload a file
//! - Agents: one-shot architect, save, chat
//! - OAuth connections: authorization URL, token listing, token clearing
//!
//! # Example
//!
//! ```no_run
//! use build_client::{BuildClient, ClientConfig, ContinueInputs};
//!
//! # async fn example() -> Result<(), build_client::ClientError> {
//! let client = BuildClient::new(ClientConfig::default())?;
//!
//! let session = client.create_session("Build an email bot").await?;
//! println!("{} is {}", session.build_id, session.state);
//!
//! let session = client
//!     .continue_session(&session.build_id, &ContinueInputs::message("Use my support inbox"))
//!     .await?;
//! println!("now {}", session.state);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use client::BuildClient;
pub use config::{
    AppConfig, ClientConfig, ConfigError, SupabaseConfig, DEFAULT_BACKEND_URL,
    DEFAULT_PROGRESS_TICK, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_EMAIL,
};
pub use error::ClientError;
pub use transport::{AgentTransport, SessionTransport};
pub use types::*;
