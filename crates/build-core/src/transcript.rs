//! Chat transcript for a build conversation.
//!
//! The transcript only grows within a session. Agent-originated messages are
//! deduplicated on content so repeated reductions of the same session never
//! produce duplicate entries.

use serde::Serialize;

use crate::agent::AgentConfiguration;
use crate::message::{ChatMessage, MessageRole};
use crate::session::BuildSession;
use crate::summary::completion_summary;

/// User message recorded when a proposed configuration is approved.
pub const APPROVAL_MESSAGE: &str = "Yes, please proceed with the build!";

/// Ordered, append-only list of chat messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transcript with the user's initial prompt.
    pub fn start(prompt: &str) -> Self {
        let mut transcript = Self::new();
        if !prompt.trim().is_empty() {
            transcript.push_user(prompt);
        }
        transcript
    }

    /// Rebuild a transcript from the initial prompt and the session history.
    ///
    /// Every history entry with a message is replayed through the same rule
    /// used for live updates, so deriving twice from the same session yields
    /// the same conversation.
    pub fn derive(prompt: &str, session: &BuildSession) -> Self {
        let mut transcript = Self::start(prompt);
        for message in session
            .history
            .iter()
            .filter_map(|entry| entry.message_to_user.as_deref())
            .filter(|message| !message.is_empty())
        {
            transcript.push_if_new_tail(message);
        }
        transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Role and content of every message, without ids or timestamps.
    pub fn lines(&self) -> Vec<(MessageRole, &str)> {
        self.messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect()
    }

    /// Whether any message already has this exact content.
    pub fn contains(&self, content: &str) -> bool {
        self.messages.iter().any(|m| m.content == content)
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::user(content));
        &self.messages[self.messages.len() - 1]
    }

    /// Append an agent message unless one with identical content exists.
    ///
    /// Returns `true` if the message was appended.
    pub fn push_agent(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.contains(&content) {
            return false;
        }
        self.messages.push(ChatMessage::agent(content));
        true
    }

    /// Append the session's latest architect message if it differs from the
    /// last transcript entry.
    pub fn augment_from_session(&mut self, session: &BuildSession) -> Option<&ChatMessage> {
        let message = session.last_message_to_user()?;
        if self.push_if_new_tail(message) {
            self.messages.last()
        } else {
            None
        }
    }

    fn push_if_new_tail(&mut self, content: &str) -> bool {
        if self.last().map(|m| m.content.as_str()) == Some(content) {
            return false;
        }
        self.messages.push(ChatMessage::agent(content));
        true
    }

    /// Record a clarification question and the user's answer.
    ///
    /// A question already in the transcript is not repeated; the answer always is.
    pub fn push_clarification(&mut self, question: &str, answer: impl Into<String>) {
        let prompt = format!(
            "To better understand your requirements, I need to know: {}",
            question
        );
        if !self.contains(&prompt) {
            self.messages
                .push(ChatMessage::new("clarification", MessageRole::Agent, prompt));
        }
        self.messages
            .push(ChatMessage::new("answer", MessageRole::User, answer));
    }

    /// Record the user's approval of a proposed configuration.
    pub fn push_approval(&mut self) -> &ChatMessage {
        self.messages
            .push(ChatMessage::new("approve", MessageRole::User, APPROVAL_MESSAGE));
        &self.messages[self.messages.len() - 1]
    }

    /// Append the completion summary, at most once.
    pub fn push_completion_summary(&mut self, config: Option<&AgentConfiguration>) -> bool {
        self.push_agent(completion_summary(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{BuildState, HistoryEntry};

    fn session_with(messages: &[&str]) -> BuildSession {
        let mut session = BuildSession::new("b-1", BuildState::WaitingForUserInput);
        session.history = messages
            .iter()
            .map(|m| HistoryEntry::with_message(*m))
            .collect();
        session
    }

    #[test]
    fn test_start_with_prompt() {
        let transcript = Transcript::start("Build an email bot");
        assert_eq!(
            transcript.lines(),
            vec![(MessageRole::User, "Build an email bot")]
        );
        assert!(Transcript::start("   ").is_empty());
    }

    #[test]
    fn test_augment_skips_unchanged_tail() {
        let mut transcript = Transcript::start("Build an email bot");
        let session = session_with(&["Which inbox?"]);

        assert!(transcript.augment_from_session(&session).is_some());
        assert!(transcript.augment_from_session(&session).is_none());
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_augment_after_user_reply() {
        let mut transcript = Transcript::start("Build an email bot");
        transcript.augment_from_session(&session_with(&["Which inbox?"]));
        transcript.push_user("support@example.com");

        let session = session_with(&["Which inbox?", "Got it. Anything else?"]);
        let appended = transcript.augment_from_session(&session).unwrap();
        assert_eq!(appended.content, "Got it. Anything else?");
        assert_eq!(transcript.len(), 4);
    }

    #[test]
    fn test_push_agent_dedups_on_any_existing() {
        let mut transcript = Transcript::new();
        assert!(transcript.push_agent("hello"));
        transcript.push_user("hi");
        assert!(!transcript.push_agent("hello"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let session = session_with(&["Which inbox?", "Which inbox?", "Proposed config"]);
        let first = Transcript::derive("Build an email bot", &session);
        let second = Transcript::derive("Build an email bot", &session);

        assert_eq!(first.lines(), second.lines());
        assert_eq!(
            first.lines(),
            vec![
                (MessageRole::User, "Build an email bot"),
                (MessageRole::Agent, "Which inbox?"),
                (MessageRole::Agent, "Proposed config"),
            ]
        );
    }

    #[test]
    fn test_clarification_and_approval() {
        let mut transcript = Transcript::start("Build a bot");
        transcript.push_clarification("Which channel?", "#support");
        transcript.push_approval();

        let lines = transcript.lines();
        assert_eq!(
            lines[1],
            (
                MessageRole::Agent,
                "To better understand your requirements, I need to know: Which channel?"
            )
        );
        assert_eq!(lines[2], (MessageRole::User, "#support"));
        assert_eq!(lines[3], (MessageRole::User, APPROVAL_MESSAGE));
        assert!(transcript.messages()[1].id.starts_with("clarification-"));
    }

    #[test]
    fn test_repeated_clarification_keeps_one_question() {
        let mut transcript = Transcript::start("Build a CRM helper");
        transcript.push_clarification("Which team?", "Sales");
        transcript.push_clarification("Which team?", "Sales");

        let question = "To better understand your requirements, I need to know: Which team?";
        assert_eq!(
            transcript.lines(),
            vec![
                (MessageRole::User, "Build a CRM helper"),
                (MessageRole::Agent, question),
                (MessageRole::User, "Sales"),
                (MessageRole::User, "Sales"),
            ]
        );
    }

    #[test]
    fn test_completion_summary_once() {
        let mut transcript = Transcript::start("Build a bot");
        assert!(transcript.push_completion_summary(None));
        assert!(!transcript.push_completion_summary(None));
        assert_eq!(transcript.len(), 2);
    }
}
