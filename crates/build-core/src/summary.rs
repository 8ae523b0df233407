//! Completion summary shown once an agent is ready.
//!
//! The agent "type" is picked from the configuration with a fixed
//! precedence: email, then chat, then project management, then database,
//! then a generic fallback.

use crate::agent::AgentConfiguration;

/// Message used when no configuration is known.
pub const GENERIC_READY_MESSAGE: &str = "Your AI agent is ready! You can now test and deploy it.";

/// Broad category of a configured agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    EmailManagement,
    Communication,
    ProjectManagement,
    Database,
    GeneralPurpose,
}

impl AgentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmailManagement => "Email Management",
            Self::Communication => "Communication",
            Self::ProjectManagement => "Project Management",
            Self::Database => "Database",
            Self::GeneralPurpose => "General Purpose AI",
        }
    }
}

/// Result of classifying a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSummary {
    pub kind: AgentKind,
    pub capabilities: Vec<String>,
}

impl AgentSummary {
    /// Render the summary as a user-facing sentence.
    pub fn sentence(&self) -> String {
        let capability_text = if self.capabilities.is_empty() {
            String::new()
        } else {
            format!(" with {} capabilities", self.capabilities.join(", "))
        };

        format!(
            "Your {} agent is ready! You can now test it{} and start leveraging its features.",
            self.kind.label(),
            capability_text
        )
    }
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Classify a configuration into an agent kind plus capability phrases.
pub fn classify(config: &AgentConfiguration) -> AgentSummary {
    let (kind, capabilities) = if config.needs_oauth("gmail") || config.needs_oauth("google") {
        (
            AgentKind::EmailManagement,
            phrases(&["Gmail integration", "email automation"]),
        )
    } else if config.needs_oauth("slack") {
        (
            AgentKind::Communication,
            phrases(&["Slack integration", "team collaboration"]),
        )
    } else if config.needs_oauth("jira") {
        (
            AgentKind::ProjectManagement,
            phrases(&["Jira integration", "issue tracking"]),
        )
    } else if config.uses_tool("supabase_query") {
        (
            AgentKind::Database,
            phrases(&["database queries", "data analysis"]),
        )
    } else if config.prerequisites.oauth.is_empty() {
        (
            AgentKind::GeneralPurpose,
            phrases(&["intelligent conversation"]),
        )
    } else {
        (AgentKind::GeneralPurpose, config.prerequisites.oauth.clone())
    };

    AgentSummary { kind, capabilities }
}

/// Build the completion message for an optional configuration.
pub fn completion_summary(config: Option<&AgentConfiguration>) -> String {
    match config {
        Some(config) => classify(config).sentence(),
        None => GENERIC_READY_MESSAGE.to_string(),
    }
}
