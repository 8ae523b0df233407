//! Core types and pure protocol logic for agent build sessions.
//!
//! A build session is a multi-turn negotiation between the user and the
//! backend architect that converges on an [`AgentConfiguration`]. This crate
//! holds everything about that protocol that needs no I/O:
//!
//! - [`BuildSession`] / [`BuildState`] - the server-owned session
//! - [`reduce`] - maps a session onto [`ClientState`] plus UI [`Intent`]s
//! - [`Transcript`] - the deduplicated chat transcript
//! - [`UiRequestDispatcher`] - server-driven modal requests
//! - [`ProgressModel`] - the simulated build progress
//! - [`ConnectionMap`] / [`OAuthProvider`] - OAuth connection status
//!
//! # Example
//!
//! ```rust
//! use build_core::{reduce, BuildSession, BuildState, ClientState, Intent};
//!
//! let state = ClientState::for_prompt("Build an email bot");
//! let session = BuildSession::new("b-1", BuildState::WaitingForUserInput);
//!
//! let reduction = reduce(&state, &session);
//! assert_eq!(reduction.intents, vec![Intent::StopThinking, Intent::EnableInput]);
//! ```

mod agent;
mod connections;
mod dispatcher;
mod error;
mod message;
mod progress;
mod redirect;
mod reducer;
mod session;
mod summary;
mod transcript;

pub use agent::{AgentConfiguration, Prerequisites};
pub use connections::{ConnectionMap, ConnectionStatus, OAuthProvider, ProviderScope, TokenUser};
pub use dispatcher::{PendingRequest, ServerModal, UiRequestDispatcher, UserPanel, UserPanels};
pub use error::CoreError;
pub use message::{ChatMessage, MessageRole};
pub use progress::{ProgressModel, Tick, DEFAULT_BUILD_STEPS, TICKS_PER_STEP};
pub use redirect::{strip_query, AuthOutcome, RedirectParams};
pub use reducer::{
    reduce, ClientState, Intent, Reduction, BUILD_FAILED_MESSAGE, DB_CONNECTION_FAILED_MESSAGE,
    MISSING_CONFIG_MESSAGE,
};
pub use session::{
    BuildSession, BuildState, HistoryEntry, UiRequest, UiRequestKind, REQUEST_DB_CREDENTIALS,
};
pub use summary::{classify, completion_summary, AgentKind, AgentSummary, GENERIC_READY_MESSAGE};
pub use transcript::{Transcript, APPROVAL_MESSAGE};
