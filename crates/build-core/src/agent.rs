//! Agent configuration produced by the architect.

use std::collections::BTreeSet;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Deserialize `null` (or a missing field with `#[serde(default)]`) as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept ids sent either as strings or as integers.
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Preconditions the backend says must hold before the agent can run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisites {
    /// OAuth provider ids, in the order the architect listed them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub oauth: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub database_credentials: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinecone_index_name: Option<String>,
}

/// Agent configuration as negotiated in a build session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    /// Saved agent id. Only present once the backend persisted the agent.
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub llm_model: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub system_prompt: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tools_to_activate: BTreeSet<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub prerequisites: Prerequisites,
}

impl AgentConfiguration {
    /// Whether the given OAuth provider is a prerequisite.
    pub fn needs_oauth(&self, provider: &str) -> bool {
        self.prerequisites.oauth.iter().any(|p| p == provider)
    }

    /// Whether the given tool is activated.
    pub fn uses_tool(&self, tool: &str) -> bool {
        self.tools_to_activate.contains(tool)
    }

    pub fn needs_database(&self) -> bool {
        self.prerequisites.database_credentials
    }
}
