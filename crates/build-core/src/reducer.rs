//! Session state reducer.
//!
//! Maps the latest [`BuildSession`] onto the client's view state and lists the
//! UI intents that follow from it. The reducer performs no I/O and never
//! changes the session itself.

use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::AgentConfiguration;
use crate::session::{BuildSession, BuildState, UiRequestKind};
use crate::transcript::Transcript;

/// Error shown when the build fails.
pub const BUILD_FAILED_MESSAGE: &str =
    "The build failed. Send another message to try again.";

/// Error shown in the credentials modal when the connection test fails.
pub const DB_CONNECTION_FAILED_MESSAGE: &str =
    "Database connection failed. Please check your credentials and try again.";

/// Error shown when a configured state arrives without any configuration.
pub const MISSING_CONFIG_MESSAGE: &str =
    "The architect finished without returning an agent configuration.";

/// A UI-facing consequence of a reduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    /// Hide the "thinking" indicator.
    StopThinking,
    /// Allow the user to type.
    EnableInput,
    /// An architect message was appended to the transcript.
    AppendAgentMessage(String),
    /// Present the proposed configuration.
    ShowProposedConfig,
    /// Wait for the user to approve or refine the proposal.
    AwaitApproval,
    /// The agent configuration was stored.
    StoreAgentConfig,
    /// The saved agent id was captured.
    CaptureAgentId(String),
    /// Show the architecture view.
    RevealArchitecture,
    /// Reset build progress to zero, starting the progress driver.
    ResetProgress,
    /// Surface an error in the conversation.
    ShowError(String),
    OpenCredentialsModal,
    CloseCredentialsModal,
    /// Surface an error inside the credentials modal.
    ShowCredentialsError(String),
}

/// Client-side view state derived from the session stream.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientState {
    /// State of the last reduced session.
    pub last_state: Option<BuildState>,
    pub thinking: bool,
    pub input_enabled: bool,
    pub awaiting_approval: bool,
    pub agent_config: Option<AgentConfiguration>,
    pub agent_id: Option<String>,
    pub architecture_visible: bool,
    /// Configured state the architecture was last revealed for.
    pub revealed_in: Option<BuildState>,
    pub credentials_modal_open: bool,
    pub error: Option<String>,
    pub credentials_error: Option<String>,
    pub transcript: Transcript,
}

impl ClientState {
    /// Fresh state for a new prompt: transcript seeded, thinking on, input off.
    pub fn for_prompt(prompt: &str) -> Self {
        Self {
            thinking: true,
            transcript: Transcript::start(prompt),
            ..Self::default()
        }
    }
}

/// Output of [`reduce`].
#[derive(Debug, Clone)]
pub struct Reduction {
    pub state: ClientState,
    pub intents: Vec<Intent>,
}

impl Reduction {
    /// Whether the reduction produced the given intent.
    pub fn has(&self, intent: &Intent) -> bool {
        self.intents.contains(intent)
    }
}

/// Reduce a session into the next client state and its intents.
pub fn reduce(current: &ClientState, session: &BuildSession) -> Reduction {
    let mut next = current.clone();
    let mut intents = Vec::new();
    debug!(
        build_id = %session.build_id,
        state = %session.state,
        previous = ?current.last_state,
        "reducing build session"
    );

    if let Some(message) = next.transcript.augment_from_session(session) {
        intents.push(Intent::AppendAgentMessage(message.content.clone()));
    }

    if let Some(UiRequestKind::Unrecognized(kind)) =
        session.ui_request.as_ref().map(|request| request.kind())
    {
        warn!(
            build_id = %session.build_id,
            request_type = %kind,
            "ignoring unrecognized ui_request"
        );
    }
    if session.wants_db_credentials() {
        open_credentials(&mut next, &mut intents);
    }

    match session.state {
        BuildState::WaitingForUserInput => {
            stop_thinking(&mut next, &mut intents);
            enable_input(&mut next, &mut intents);
        }
        BuildState::ConfigurationProposed => {
            stop_thinking(&mut next, &mut intents);
            enable_input(&mut next, &mut intents);
            next.awaiting_approval = true;
            intents.push(Intent::ShowProposedConfig);
            intents.push(Intent::AwaitApproval);
        }
        BuildState::ConfigurationFinalized => {
            configured(current, session, false, &mut next, &mut intents);
        }
        BuildState::Failed => {
            stop_thinking(&mut next, &mut intents);
            next.input_enabled = true;
            next.error = Some(BUILD_FAILED_MESSAGE.to_string());
            intents.push(Intent::ShowError(BUILD_FAILED_MESSAGE.to_string()));
        }
        BuildState::RequestDbCredentials => {
            stop_thinking(&mut next, &mut intents);
        }
        BuildState::Completed => {
            if next.credentials_modal_open {
                next.credentials_modal_open = false;
                intents.push(Intent::CloseCredentialsModal);
            }
            next.credentials_error = None;
            configured(current, session, true, &mut next, &mut intents);
        }
        BuildState::DbConnectionFailed => {
            stop_thinking(&mut next, &mut intents);
            open_credentials(&mut next, &mut intents);
            next.credentials_error = Some(DB_CONNECTION_FAILED_MESSAGE.to_string());
            intents.push(Intent::ShowCredentialsError(
                DB_CONNECTION_FAILED_MESSAGE.to_string(),
            ));
        }
    }

    if !session.state.is_configured() {
        next.revealed_in = None;
    }
    next.last_state = Some(session.state);
    Reduction {
        state: next,
        intents,
    }
}

fn stop_thinking(next: &mut ClientState, intents: &mut Vec<Intent>) {
    next.thinking = false;
    intents.push(Intent::StopThinking);
}

fn enable_input(next: &mut ClientState, intents: &mut Vec<Intent>) {
    next.input_enabled = true;
    intents.push(Intent::EnableInput);
}

fn open_credentials(next: &mut ClientState, intents: &mut Vec<Intent>) {
    if !next.credentials_modal_open {
        next.credentials_modal_open = true;
        intents.push(Intent::OpenCredentialsModal);
    }
}

fn configured(
    current: &ClientState,
    session: &BuildSession,
    completed: bool,
    next: &mut ClientState,
    intents: &mut Vec<Intent>,
) {
    stop_thinking(next, intents);
    next.awaiting_approval = false;

    let Some(config) = session
        .agent_config
        .clone()
        .or_else(|| current.agent_config.clone())
    else {
        warn!(
            build_id = %session.build_id,
            state = %session.state,
            "session is configured but carries no agent_config"
        );
        next.input_enabled = true;
        next.error = Some(MISSING_CONFIG_MESSAGE.to_string());
        intents.push(Intent::ShowError(MISSING_CONFIG_MESSAGE.to_string()));
        return;
    };

    intents.push(Intent::StoreAgentConfig);
    if completed {
        if let Some(id) = config.id.clone() {
            next.agent_id = Some(id.clone());
            intents.push(Intent::CaptureAgentId(id));
        } else {
            warn!(build_id = %session.build_id, "completed session has no agent id");
        }
    }
    next.agent_config = Some(config);
    next.error = None;

    if current.revealed_in != Some(session.state) {
        next.architecture_visible = true;
        next.revealed_in = Some(session.state);
        intents.push(Intent::RevealArchitecture);
        intents.push(Intent::ResetProgress);
    }
}
