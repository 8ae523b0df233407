//! Build session types as returned by the backend build API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::AgentConfiguration;

/// `ui_request.type` value asking the client for database credentials.
pub const REQUEST_DB_CREDENTIALS: &str = "REQUEST_DB_CREDENTIALS";

/// Server-side state of a build session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildState {
    /// The architect asked something and waits for the user.
    WaitingForUserInput,
    /// A configuration was proposed and needs explicit approval.
    ConfigurationProposed,
    /// The configuration is final; `agent_config` is set.
    ConfigurationFinalized,
    /// The build failed. The conversation stays open for another attempt.
    Failed,
    /// The architect needs a database connection string.
    RequestDbCredentials,
    /// The agent was built and saved; `agent_config` carries its id.
    Completed,
    /// The submitted database credentials did not work.
    DbConnectionFailed,
}

impl BuildState {
    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForUserInput => "WAITING_FOR_USER_INPUT",
            Self::ConfigurationProposed => "CONFIGURATION_PROPOSED",
            Self::ConfigurationFinalized => "CONFIGURATION_FINALIZED",
            Self::Failed => "FAILED",
            Self::RequestDbCredentials => "REQUEST_DB_CREDENTIALS",
            Self::Completed => "COMPLETED",
            Self::DbConnectionFailed => "DB_CONNECTION_FAILED",
        }
    }

    /// Whether the session carries a usable agent configuration in this state.
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::ConfigurationFinalized | Self::Completed)
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn recorded by the architect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Text the architect wants shown to the user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_to_user: Option<String>,

    /// Remaining fields, kept opaque.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    /// Create an entry carrying a user-facing message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message_to_user: Some(message.into()),
            extra: Map::new(),
        }
    }
}

/// A one-shot instruction from the server telling the client what to show next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiRequest {
    /// Raw request type.
    #[serde(rename = "type")]
    pub request_type: String,

    /// Optional request payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Interpreted `ui_request.type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiRequestKind {
    /// Open the database credentials modal.
    RequestDbCredentials,
    /// A type this client does not know how to present.
    Unrecognized(String),
}

impl UiRequest {
    /// Create a request of the given type without payload.
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            data: None,
        }
    }

    /// Interpret the request type.
    pub fn kind(&self) -> UiRequestKind {
        match self.request_type.as_str() {
            REQUEST_DB_CREDENTIALS => UiRequestKind::RequestDbCredentials,
            other => UiRequestKind::Unrecognized(other.to_string()),
        }
    }
}

/// Server-owned build session, cached by the client and replaced wholesale
/// by every transport response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSession {
    pub build_id: String,
    pub state: BuildState,
    #[serde(default)]
    pub original_prompt: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_config: Option<AgentConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_request: Option<UiRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_connection_string: Option<String>,
    #[serde(default, deserialize_with = "crate::agent::null_as_default")]
    pub uploaded_file_paths: Vec<String>,
}

impl BuildSession {
    /// Create an empty session in the given state.
    pub fn new(build_id: impl Into<String>, state: BuildState) -> Self {
        Self {
            build_id: build_id.into(),
            state,
            original_prompt: String::new(),
            history: Vec::new(),
            agent_config: None,
            ui_request: None,
            db_connection_string: None,
            uploaded_file_paths: Vec::new(),
        }
    }

    /// The message attached to the most recent history entry.
    ///
    /// Only the last entry counts; an empty message is treated as absent.
    pub fn last_message_to_user(&self) -> Option<&str> {
        self.history
            .last()
            .and_then(|entry| entry.message_to_user.as_deref())
            .filter(|message| !message.is_empty())
    }

    /// Whether either the state or the ui_request asks for database credentials.
    pub fn wants_db_credentials(&self) -> bool {
        self.state == BuildState::RequestDbCredentials
            || self
                .ui_request
                .as_ref()
                .is_some_and(|request| request.kind() == UiRequestKind::RequestDbCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session() {
        let json = r#"{
            "build_id": "b-1",
            "state": "WAITING_FOR_USER_INPUT",
            "original_prompt": "Build an email bot",
            "history": [
                {"role": "architect", "message_to_user": "Which inbox should I watch?"}
            ],
            "agent_config": null,
            "ui_request": null
        }"#;

        let session: BuildSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.build_id, "b-1");
        assert_eq!(session.state, BuildState::WaitingForUserInput);
        assert_eq!(
            session.last_message_to_user(),
            Some("Which inbox should I watch?")
        );
        assert_eq!(session.history[0].extra["role"], "architect");
        assert!(session.uploaded_file_paths.is_empty());
    }

    #[test]
    fn test_state_wire_names() {
        for state in [
            BuildState::WaitingForUserInput,
            BuildState::ConfigurationProposed,
            BuildState::ConfigurationFinalized,
            BuildState::Failed,
            BuildState::RequestDbCredentials,
            BuildState::Completed,
            BuildState::DbConnectionFailed,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let json = r#"{"build_id": "b-1", "state": "SOMETHING_NEW"}"#;
        assert!(serde_json::from_str::<BuildSession>(json).is_err());
    }

    #[test]
    fn test_last_message_ignores_earlier_entries() {
        let mut session = BuildSession::new("b-1", BuildState::WaitingForUserInput);
        session.history.push(HistoryEntry::with_message("first"));
        session.history.push(HistoryEntry::default());
        assert_eq!(session.last_message_to_user(), None);

        session.history.push(HistoryEntry::with_message(""));
        assert_eq!(session.last_message_to_user(), None);
    }

    #[test]
    fn test_wants_db_credentials_both_paths() {
        let by_state = BuildSession::new("b", BuildState::RequestDbCredentials);
        assert!(by_state.wants_db_credentials());

        let mut by_request = BuildSession::new("b", BuildState::WaitingForUserInput);
        by_request.ui_request = Some(UiRequest::new(REQUEST_DB_CREDENTIALS));
        assert!(by_request.wants_db_credentials());

        let mut neither = BuildSession::new("b", BuildState::WaitingForUserInput);
        neither.ui_request = Some(UiRequest::new("REQUEST_CSV_FILE"));
        assert!(!neither.wants_db_credentials());
    }

    #[test]
    fn test_ui_request_kind() {
        assert_eq!(
            UiRequest::new("REQUEST_DB_CREDENTIALS").kind(),
            UiRequestKind::RequestDbCredentials
        );
        assert_eq!(
            UiRequest::new("REQUEST_CSV_FILE").kind(),
            UiRequestKind::Unrecognized("REQUEST_CSV_FILE".to_string())
        );
    }
}
