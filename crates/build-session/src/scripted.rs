//! Scripted transport for exercising controllers without a backend.
//!
//! Replies are queued up front and handed out in order. Every call is
//! recorded so tests can assert on what the controller sent.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use build_client::{
    AgentChatRequest, AgentChatResponse, AgentTransport, ClientError, ContinueInputs, FileUpload,
    SessionTransport,
};
use build_core::BuildSession;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// A queued reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this session.
    Session(BuildSession),
    /// Fail with this HTTP status and body.
    Failure { status: u16, body: String },
}

impl From<BuildSession> for ScriptedReply {
    fn from(session: BuildSession) -> Self {
        ScriptedReply::Session(session)
    }
}

/// A call the transport received.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Create { prompt: String },
    Continue { build_id: String, inputs: ContinueInputs },
    Upload { build_id: String, file_name: String },
    Chat { agent_id: String, request: AgentChatRequest },
}

/// Transport that answers from a script.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    chat_replies: Mutex<VecDeque<Result<String, u16>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Duration,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with session replies queued in order.
    pub fn with_replies<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ScriptedReply>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Delay every reply, to simulate a slow backend.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue another session reply.
    pub async fn push(&self, reply: impl Into<ScriptedReply>) {
        self.replies.lock().await.push_back(reply.into());
    }

    /// Queue an agent chat reply, or an HTTP status to fail with.
    pub async fn push_chat(&self, reply: Result<String, u16>) {
        self.chat_replies.lock().await.push_back(reply);
    }

    /// Every call received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    async fn next_reply<F>(&self, call: RecordedCall, on_failure: F) -> Result<BuildSession, ClientError>
    where
        F: FnOnce(u16, String) -> ClientError,
    {
        self.calls.lock().await.push(call);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.replies.lock().await.pop_front() {
            Some(ScriptedReply::Session(session)) => Ok(session),
            Some(ScriptedReply::Failure { status, body }) => Err(on_failure(status, body)),
            None => Err(ClientError::Api {
                endpoint: "scripted",
                status: 500,
                body: "no scripted reply left".to_string(),
            }),
        }
    }
}

#[async_trait]
impl SessionTransport for ScriptedTransport {
    async fn create_session(&self, prompt: &str) -> Result<BuildSession, ClientError> {
        let call = RecordedCall::Create {
            prompt: prompt.to_string(),
        };
        self.next_reply(call, |status, body| ClientError::SessionCreate { status, body })
            .await
    }

    async fn continue_session(
        &self,
        build_id: &str,
        inputs: &ContinueInputs,
    ) -> Result<BuildSession, ClientError> {
        let call = RecordedCall::Continue {
            build_id: build_id.to_string(),
            inputs: inputs.clone(),
        };
        self.next_reply(call, |status, body| ClientError::SessionContinue { status, body })
            .await
    }

    async fn upload_file(
        &self,
        build_id: &str,
        file: FileUpload,
    ) -> Result<BuildSession, ClientError> {
        let call = RecordedCall::Upload {
            build_id: build_id.to_string(),
            file_name: file.file_name,
        };
        self.next_reply(call, |status, body| ClientError::Upload { status, body })
            .await
    }
}

#[async_trait]
impl AgentTransport for ScriptedTransport {
    async fn chat_with_agent(
        &self,
        agent_id: &str,
        request: &AgentChatRequest,
    ) -> Result<AgentChatResponse, ClientError> {
        self.calls.lock().await.push(RecordedCall::Chat {
            agent_id: agent_id.to_string(),
            request: request.clone(),
        });
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.chat_replies.lock().await.pop_front() {
            Some(Ok(response)) => Ok(AgentChatResponse { response }),
            Some(Err(status)) => Err(ClientError::Api {
                endpoint: "agent chat",
                status,
                body: String::new(),
            }),
            None => Err(ClientError::Api {
                endpoint: "agent chat",
                status: 500,
                body: "no scripted reply left".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use build_core::BuildState;

    #[tokio::test]
    async fn test_replies_in_order_and_records_calls() {
        let transport = ScriptedTransport::with_replies([
            BuildSession::new("b-1", BuildState::WaitingForUserInput),
            BuildSession::new("b-1", BuildState::ConfigurationProposed),
        ]);

        let first = transport.create_session("hi").await.unwrap();
        let second = transport
            .continue_session("b-1", &ContinueInputs::message("more"))
            .await
            .unwrap();

        assert_eq!(first.state, BuildState::WaitingForUserInput);
        assert_eq!(second.state, BuildState::ConfigurationProposed);
        assert_eq!(
            transport.calls().await,
            vec![
                RecordedCall::Create {
                    prompt: "hi".to_string()
                },
                RecordedCall::Continue {
                    build_id: "b-1".to_string(),
                    inputs: ContinueInputs::message("more"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_maps_to_endpoint_error() {
        let transport = ScriptedTransport::new();
        transport
            .push(ScriptedReply::Failure {
                status: 422,
                body: r#"{"detail": "bad file"}"#.to_string(),
            })
            .await;

        let err = transport
            .upload_file("b-1", FileUpload::new("a.csv", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Upload { status: 422, .. }));
        assert_eq!(err.detail().as_deref(), Some("bad file"));
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let transport = ScriptedTransport::new();
        assert!(transport.create_session("hi").await.is_err());
        assert!(transport
            .chat_with_agent("1", &AgentChatRequest::for_agent("1", "me@example.com", "hi"))
            .await
            .is_err());
    }
}
