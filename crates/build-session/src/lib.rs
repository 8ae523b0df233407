//! Build session controller.
//!
//! Ties the pure protocol in `build-core` to a transport from
//! `build-client`:
//!
//! - [`BuildController`] - drives one build conversation
//! - [`ProgressDriver`] - timer-driven simulated build progress
//! - [`AppContext`] - configuration, shared client and shutdown token
//! - [`ScriptedTransport`] - canned replies for tests and demos
//!
//! # Example
//!
//! ```no_run
//! use build_session::{AppContext, ControllerError};
//!
//! # async fn example() -> Result<(), ControllerError> {
//! let context = AppContext::from_env()?;
//! let mut controller = context.build_controller();
//!
//! controller.start("Build an email bot").await?;
//! for (role, text) in controller.transcript().lines() {
//!     println!("{:?}: {}", role, text);
//! }
//! # Ok(())
//! # }
//! ```

mod context;
mod controller;
mod credentials;
mod error;
mod progress;
mod scripted;

pub use context::AppContext;
pub use controller::{BuildController, ControllerConfig, AGENT_CHAT_ERROR_MESSAGE};
pub use credentials::{DbCredentials, DEFAULT_DB_PORT};
pub use error::ControllerError;
pub use progress::{ProgressDriver, ProgressHandle, ProgressUpdate};
pub use scripted::{RecordedCall, ScriptedReply, ScriptedTransport};
