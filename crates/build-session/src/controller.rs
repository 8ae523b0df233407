//! Build controller.
//!
//! Owns one build conversation: it calls the transport, feeds every session
//! it gets back through [`reduce`], and applies the resulting intents to the
//! dispatcher and the progress driver. Operations take `&mut self`, so at
//! most one backend call is outstanding per controller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use build_client::{
    AgentChatRequest, AgentTransport, AppConfig, ClientError, ContinueInputs, FileUpload,
    SessionTransport, DEFAULT_PROGRESS_TICK, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_EMAIL,
};
use build_core::{
    reduce, BuildSession, ChatMessage, ClientState, Intent, PendingRequest, Reduction,
    ServerModal, Transcript, UiRequestDispatcher, UserPanel, UserPanels, APPROVAL_MESSAGE,
    DEFAULT_BUILD_STEPS,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::credentials::DbCredentials;
use crate::error::ControllerError;
use crate::progress::{ProgressDriver, ProgressHandle};

/// Agent reply shown when chatting with a saved agent fails.
pub const AGENT_CHAT_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Settings for a build controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound on every backend call.
    pub request_timeout: Duration,
    /// Interval between simulated progress ticks.
    pub progress_tick: Duration,
    /// Email sent with agent chat requests.
    pub user_email: String,
    /// Step labels shown while the agent is built.
    pub steps: Vec<String>,
}

impl ControllerConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            request_timeout: config.client.request_timeout,
            progress_tick: config.progress_tick,
            user_email: config.client.user_email.clone(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            progress_tick: DEFAULT_PROGRESS_TICK,
            user_email: DEFAULT_USER_EMAIL.to_string(),
            steps: DEFAULT_BUILD_STEPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Drives one build conversation against a transport.
pub struct BuildController<T> {
    transport: Arc<T>,
    config: ControllerConfig,
    cancel: CancellationToken,
    prompt: String,
    session: Option<BuildSession>,
    state: ClientState,
    dispatcher: UiRequestDispatcher,
    panels: UserPanels,
    progress: ProgressDriver,
    progress_handle: Option<ProgressHandle>,
    agent_chat: Vec<ChatMessage>,
}

impl<T: SessionTransport + AgentTransport> BuildController<T> {
    /// Create a controller. Cancelling `cancel` aborts any in-flight call.
    pub fn new(transport: Arc<T>, config: ControllerConfig, cancel: CancellationToken) -> Self {
        let progress = ProgressDriver::new(config.steps.clone(), config.progress_tick, cancel.clone());
        Self {
            transport,
            config,
            cancel,
            prompt: String::new(),
            session: None,
            state: ClientState::default(),
            dispatcher: UiRequestDispatcher::new(),
            panels: UserPanels::default(),
            progress,
            progress_handle: None,
            agent_chat: Vec::new(),
        }
    }

    /// Start a new build for a prompt, discarding any previous one.
    pub async fn start(&mut self, prompt: &str) -> Result<Vec<Intent>, ControllerError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ControllerError::EmptyMessage);
        }

        self.progress.cancel();
        self.progress_handle = None;
        self.dispatcher.reset();
        self.panels = UserPanels::default();
        self.session = None;
        self.prompt = prompt.to_string();
        self.state = ClientState::for_prompt(prompt);

        info!(prompt_len = prompt.len(), "Starting build");

        let transport = Arc::clone(&self.transport);
        let result = self.call(transport.create_session(prompt)).await;
        self.settle(result)
    }

    /// Send a chat message to the architect.
    pub async fn send_message(&mut self, text: &str) -> Result<Vec<Intent>, ControllerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyMessage);
        }
        let build_id = self.build_id()?;

        self.state.transcript.push_user(text);
        self.continue_with(build_id, ContinueInputs::message(text))
            .await
    }

    /// Send database credentials requested by the server.
    pub async fn submit_credentials(
        &mut self,
        credentials: &DbCredentials,
    ) -> Result<Vec<Intent>, ControllerError> {
        credentials.validate()?;
        let build_id = self.build_id()?;

        debug!(
            build_id = %build_id,
            host = %credentials.host,
            database = %credentials.database,
            "Submitting database credentials"
        );
        self.state.credentials_error = None;
        let inputs = ContinueInputs::connection_string(credentials.connection_string());
        self.continue_with(build_id, inputs).await
    }

    /// Upload one file into the session.
    pub async fn upload_file(&mut self, file: FileUpload) -> Result<Vec<Intent>, ControllerError> {
        let build_id = self.build_id()?;
        info!(build_id = %build_id, file_name = %file.file_name, "Uploading file");

        self.begin_call();
        let transport = Arc::clone(&self.transport);
        let result = self.call(transport.upload_file(&build_id, file)).await;
        let intents = self.settle(result)?;
        self.panels.close(UserPanel::FileUpload);
        Ok(intents)
    }

    /// Approve the proposed configuration.
    pub async fn approve(&mut self) -> Result<Vec<Intent>, ControllerError> {
        if !self.state.awaiting_approval {
            return Err(ControllerError::NotAwaitingApproval);
        }
        let build_id = self.build_id()?;

        self.state.transcript.push_approval();
        self.state.awaiting_approval = false;
        self.continue_with(build_id, ContinueInputs::message(APPROVAL_MESSAGE))
            .await
    }

    /// Answer a clarification question and continue the build with it.
    pub async fn answer_clarification(
        &mut self,
        question: &str,
        answer: &str,
    ) -> Result<Vec<Intent>, ControllerError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ControllerError::EmptyMessage);
        }
        let build_id = self.build_id()?;

        self.state.transcript.push_clarification(question, answer);
        self.continue_with(build_id, ContinueInputs::message(answer))
            .await
    }

    /// Reduce a session into the controller and act on its intents.
    pub fn apply(&mut self, session: BuildSession) -> Vec<Intent> {
        let Reduction { state, intents } = reduce(&self.state, &session);
        self.state = state;

        // Server requests always replace whatever is pending.
        let submitted = session
            .ui_request
            .as_ref()
            .and_then(|request| self.dispatcher.submit(request));

        for intent in &intents {
            match intent {
                Intent::OpenCredentialsModal if submitted.is_none() => {
                    self.dispatcher.request(ServerModal::DatabaseCredentials, None);
                }
                Intent::CloseCredentialsModal => {
                    self.dispatcher.dismiss(ServerModal::DatabaseCredentials);
                }
                Intent::ResetProgress => {
                    if self.progress.is_running() {
                        debug!(build_id = %session.build_id, "restarting build progress");
                    }
                    self.progress_handle = Some(self.progress.start());
                }
                Intent::CaptureAgentId(id) => {
                    info!(build_id = %session.build_id, agent_id = %id, "Agent saved");
                }
                Intent::ShowError(message) => {
                    warn!(build_id = %session.build_id, %message, "Build reported an error");
                }
                _ => {}
            }
        }

        self.session = Some(session);
        intents
    }

    /// Append the completion summary once simulated progress has finished.
    ///
    /// Returns `false` if the summary was already shown.
    pub fn mark_ready(&mut self) -> bool {
        self.state
            .transcript
            .push_completion_summary(self.state.agent_config.as_ref())
    }

    /// Chat with the agent this build produced.
    pub async fn chat_with_agent(&mut self, text: &str) -> Result<String, ControllerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyMessage);
        }
        let Some(agent_id) = self.state.agent_id.clone() else {
            error!("Agent chat requested without an agent id");
            return Err(ControllerError::MissingAgentId);
        };

        self.agent_chat.push(ChatMessage::user(text));
        let request = AgentChatRequest::for_agent(&agent_id, &self.config.user_email, text);
        let transport = Arc::clone(&self.transport);

        match self.call(transport.chat_with_agent(&agent_id, &request)).await {
            Ok(reply) => {
                self.agent_chat.push(ChatMessage::agent(reply.response.clone()));
                Ok(reply.response)
            }
            Err(ControllerError::Cancelled) => Err(ControllerError::Cancelled),
            Err(e) => {
                error!(agent_id = %agent_id, error = %e, "Agent chat failed");
                self.agent_chat
                    .push(ChatMessage::agent(AGENT_CHAT_ERROR_MESSAGE));
                Err(e)
            }
        }
    }

    /// Use an agent saved by an earlier build.
    pub fn set_agent_id(&mut self, agent_id: impl Into<String>) {
        self.state.agent_id = Some(agent_id.into());
    }

    /// Take the server-driven request waiting to be shown.
    pub fn acknowledge_request(&mut self) -> Option<PendingRequest> {
        self.dispatcher.acknowledge()
    }

    /// Close the credentials modal without submitting.
    pub fn dismiss_credentials(&mut self) {
        self.state.credentials_modal_open = false;
        self.dispatcher.dismiss(ServerModal::DatabaseCredentials);
    }

    pub fn open_panel(&mut self, panel: UserPanel) {
        self.panels.open(panel);
    }

    pub fn close_panel(&mut self, panel: UserPanel) {
        self.panels.close(panel);
    }

    /// Take the handle of the running progress, if one was started.
    pub fn take_progress(&mut self) -> Option<ProgressHandle> {
        self.progress_handle.take()
    }

    pub fn step_label(&self, index: usize) -> Option<&str> {
        self.progress.step_label(index)
    }

    /// Abort in-flight calls and stop the progress timer.
    pub fn shutdown(&mut self) {
        debug!("Shutting down build controller");
        self.cancel.cancel();
        self.progress.cancel();
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn session(&self) -> Option<&BuildSession> {
        self.session.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.state.transcript
    }

    pub fn dispatcher(&self) -> &UiRequestDispatcher {
        &self.dispatcher
    }

    pub fn panels(&self) -> &UserPanels {
        &self.panels
    }

    pub fn agent_chat(&self) -> &[ChatMessage] {
        &self.agent_chat
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    fn build_id(&self) -> Result<String, ControllerError> {
        self.session
            .as_ref()
            .map(|s| s.build_id.clone())
            .ok_or(ControllerError::NoSession)
    }

    fn begin_call(&mut self) {
        self.state.thinking = true;
        self.state.input_enabled = false;
        self.state.error = None;
    }

    async fn continue_with(
        &mut self,
        build_id: String,
        inputs: ContinueInputs,
    ) -> Result<Vec<Intent>, ControllerError> {
        self.begin_call();
        let transport = Arc::clone(&self.transport);
        let result = self
            .call(transport.continue_session(&build_id, &inputs))
            .await;
        self.settle(result)
    }

    /// Run a backend call under the request timeout and the cancel token.
    async fn call<R, F>(&self, request: F) -> Result<R, ControllerError>
    where
        F: Future<Output = Result<R, ClientError>>,
    {
        let timeout = self.config.request_timeout;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ControllerError::Cancelled),
            result = tokio::time::timeout(timeout, request) => match result {
                Ok(result) => Ok(result?),
                Err(_) => Err(ControllerError::Timeout(timeout)),
            },
        }
    }

    fn settle(
        &mut self,
        result: Result<BuildSession, ControllerError>,
    ) -> Result<Vec<Intent>, ControllerError> {
        match result {
            Ok(session) => Ok(self.apply(session)),
            Err(ControllerError::Cancelled) => {
                debug!("Build call cancelled, leaving state untouched");
                Err(ControllerError::Cancelled)
            }
            Err(e) => {
                error!(error = %e, "Build call failed");
                self.state.thinking = false;
                self.state.input_enabled = true;
                self.state.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

impl<T> Drop for BuildController<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
