//! Request and response payloads for the build backend.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use build_core::{AgentConfiguration, Prerequisites, ProviderScope, TokenUser};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default agent name used when the architect did not name the agent.
pub const DEFAULT_AGENT_NAME: &str = "New Agent";

/// Default system prompt used when the architect returned none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Default model used when the architect returned none.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContinueRequest<'a> {
    pub inputs: &'a ContinueInputs,
}

/// Inputs for continuing a build session.
///
/// `message` carries chat text, `connection_string` carries database
/// credentials. Any other keys are passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContinueInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContinueInputs {
    /// Inputs carrying a chat message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Default::default()
        }
    }

    /// Inputs carrying a database connection string.
    pub fn connection_string(conn: impl Into<String>) -> Self {
        Self {
            connection_string: Some(conn.into()),
            ..Default::default()
        }
    }

    /// Add an extra input key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A single file to upload into a build session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FileUpload {
    /// Create an upload, guessing the MIME type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            bytes,
            mime,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ArchitectRequest<'a> {
    pub prompt: &'a str,
}

/// Agent settings stored alongside a saved agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub tools_to_activate: BTreeSet<String>,
    pub prerequisites: Prerequisites,
    pub llm_model: String,
    pub pinecone_index_name: Option<String>,
}

/// Body of `POST /api/v1/agents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveAgentRequest {
    pub user_email: String,
    pub name: String,
    pub system_prompt: String,
    pub configuration: AgentSettings,
}

impl SaveAgentRequest {
    /// Build a save request from an architect configuration, filling defaults
    /// for empty fields.
    pub fn from_config(config: &AgentConfiguration, user_email: impl Into<String>) -> Self {
        let or_default = |value: &str, default: &str| {
            if value.trim().is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            user_email: user_email.into(),
            name: or_default(&config.agent_name, DEFAULT_AGENT_NAME),
            system_prompt: or_default(&config.system_prompt, DEFAULT_SYSTEM_PROMPT),
            configuration: AgentSettings {
                tools_to_activate: config.tools_to_activate.clone(),
                prerequisites: config.prerequisites.clone(),
                llm_model: or_default(&config.llm_model, DEFAULT_LLM_MODEL),
                pinecone_index_name: config.prerequisites.pinecone_index_name.clone(),
            },
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid agent id: {}", other))),
    }
}

/// A saved agent as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedAgent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/v1/agents/{id}/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentChatRequest {
    pub session_id: String,
    pub user_email: String,
    pub message: String,
}

impl AgentChatRequest {
    /// Chat request using the per-agent session id `session_{agent_id}`.
    pub fn for_agent(
        agent_id: &str,
        user_email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            session_id: format!("session_{}", agent_id),
            user_email: user_email.into(),
            message: message.into(),
        }
    }
}

/// Reply from a saved agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthUrlResponse {
    #[serde(default)]
    pub auth_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenListResponse {
    #[serde(default)]
    pub users: Vec<TokenUser>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClearTokensRequest {
    pub provider: ProviderScope,
}
