//! Transport traits used by the build controller.
//!
//! Abstracted so controllers can run against the HTTP client or a scripted
//! stand-in.

use async_trait::async_trait;
use build_core::BuildSession;

use crate::client::BuildClient;
use crate::error::ClientError;
use crate::types::{AgentChatRequest, AgentChatResponse, ContinueInputs, FileUpload};

/// The three calls that advance a build session.
///
/// Implementations perform I/O only; they never touch client state.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Create a session for a prompt.
    async fn create_session(&self, prompt: &str) -> Result<BuildSession, ClientError>;

    /// Continue a session with user inputs.
    async fn continue_session(
        &self,
        build_id: &str,
        inputs: &ContinueInputs,
    ) -> Result<BuildSession, ClientError>;

    /// Upload exactly one file into a session.
    async fn upload_file(
        &self,
        build_id: &str,
        file: FileUpload,
    ) -> Result<BuildSession, ClientError>;
}

/// Chat with an agent once it has been saved.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn chat_with_agent(
        &self,
        agent_id: &str,
        request: &AgentChatRequest,
    ) -> Result<AgentChatResponse, ClientError>;
}

#[async_trait]
impl SessionTransport for BuildClient {
    async fn create_session(&self, prompt: &str) -> Result<BuildSession, ClientError> {
        BuildClient::create_session(self, prompt).await
    }

    async fn continue_session(
        &self,
        build_id: &str,
        inputs: &ContinueInputs,
    ) -> Result<BuildSession, ClientError> {
        BuildClient::continue_session(self, build_id, inputs).await
    }

    async fn upload_file(
        &self,
        build_id: &str,
        file: FileUpload,
    ) -> Result<BuildSession, ClientError> {
        BuildClient::upload_file(self, build_id, file).await
    }
}

#[async_trait]
impl AgentTransport for BuildClient {
    async fn chat_with_agent(
        &self,
        agent_id: &str,
        request: &AgentChatRequest,
    ) -> Result<AgentChatResponse, ClientError> {
        BuildClient::chat_with_agent(self, agent_id, request).await
    }
}
