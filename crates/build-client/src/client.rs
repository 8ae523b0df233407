//! Build backend HTTP client.

use build_core::{AgentConfiguration, BuildSession, OAuthProvider, ProviderScope, TokenUser};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::{
    AgentChatRequest, AgentChatResponse, ArchitectRequest, AuthUrlResponse, ClearTokensRequest,
    ContinueInputs, ContinueRequest, CreateSessionRequest, FileUpload, SaveAgentRequest,
    SavedAgent, TokenListResponse,
};

/// Client for the build backend's HTTP API.
///
/// The client holds no session state; every call returns the backend's
/// answer and leaves caching to the caller.
#[derive(Clone)]
pub struct BuildClient {
    http: Client,
    config: ClientConfig,
}

impl BuildClient {
    /// Create a client for the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a build session for a prompt.
    pub async fn create_session(&self, prompt: &str) -> Result<BuildSession, ClientError> {
        let url = self.config.builds_url();
        debug!("Creating build session: {}", url);

        let response = self
            .http
            .post(&url)
            .json(&CreateSessionRequest { prompt })
            .send()
            .await?;

        let session: BuildSession = read_json(response, |status, body| {
            ClientError::SessionCreate { status, body }
        })
        .await?;

        info!(build_id = %session.build_id, state = %session.state, "Build session started");
        Ok(session)
    }

    /// Send inputs to an existing build session.
    pub async fn continue_session(
        &self,
        build_id: &str,
        inputs: &ContinueInputs,
    ) -> Result<BuildSession, ClientError> {
        let url = self.config.continue_url(build_id);
        debug!(
            build_id,
            has_message = inputs.message.is_some(),
            has_connection_string = inputs.connection_string.is_some(),
            "Continuing build session"
        );

        let response = self
            .http
            .post(&url)
            .json(&ContinueRequest { inputs })
            .send()
            .await?;

        let session: BuildSession = read_json(response, |status, body| {
            ClientError::SessionContinue { status, body }
        })
        .await?;

        debug!(build_id, state = %session.state, "Build session continued");
        Ok(session)
    }

    /// Upload one file into a build session.
    pub async fn upload_file(
        &self,
        build_id: &str,
        file: FileUpload,
    ) -> Result<BuildSession, ClientError> {
        let url = self.config.upload_url(build_id);
        debug!(build_id, file_name = %file.file_name, size = file.bytes.len(), "Uploading file");

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        let response = self.http.post(&url).multipart(form).send().await?;

        read_json(response, |status, body| ClientError::Upload { status, body }).await
    }

    /// Ask the architect for a configuration in one shot.
    pub async fn architect(&self, prompt: &str) -> Result<AgentConfiguration, ClientError> {
        let response = self
            .http
            .post(self.config.architect_url())
            .json(&ArchitectRequest { prompt })
            .send()
            .await?;

        read_json(response, api_error("architect")).await
    }

    /// Persist an agent.
    pub async fn save_agent(&self, request: &SaveAgentRequest) -> Result<SavedAgent, ClientError> {
        let response = self
            .http
            .post(self.config.agents_url())
            .json(request)
            .send()
            .await?;

        let agent: SavedAgent = read_json(response, api_error("save agent")).await?;
        info!(agent_id = %agent.id, "Agent saved");
        Ok(agent)
    }

    /// Send a chat message to a saved agent.
    pub async fn chat_with_agent(
        &self,
        agent_id: &str,
        request: &AgentChatRequest,
    ) -> Result<AgentChatResponse, ClientError> {
        let response = self
            .http
            .post(self.config.agent_chat_url(agent_id))
            .json(request)
            .send()
            .await?;

        read_json(response, api_error("agent chat")).await
    }

    /// Fetch the authorization URL for an OAuth provider.
    pub async fn auth_url(&self, provider: OAuthProvider) -> Result<String, ClientError> {
        let response = self.http.get(self.config.auth_url(provider)).send().await?;

        let body: AuthUrlResponse = read_json(response, api_error("auth url")).await?;
        body.auth_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClientError::MissingAuthUrl(provider.to_string()))
    }

    /// List stored provider tokens.
    pub async fn list_tokens(&self) -> Result<Vec<TokenUser>, ClientError> {
        let response = self.http.get(self.config.tokens_list_url()).send().await?;

        let body: TokenListResponse = read_json(response, api_error("list tokens")).await?;
        Ok(body.users)
    }

    /// Clear stored tokens for one provider or all of them.
    pub async fn clear_tokens(&self, scope: ProviderScope) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.config.clear_tokens_url())
            .json(&ClearTokensRequest { provider: scope })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                endpoint: "clear tokens",
                status: status.as_u16(),
                body,
            });
        }

        info!(provider = scope.as_str(), "Cleared OAuth tokens");
        Ok(())
    }
}

fn api_error(endpoint: &'static str) -> impl FnOnce(u16, String) -> ClientError {
    move |status, body| ClientError::Api {
        endpoint,
        status,
        body,
    }
}

/// Read a JSON body, mapping non-success statuses through `on_status`.
async fn read_json<R, F>(response: Response, on_status: F) -> Result<R, ClientError>
where
    R: DeserializeOwned,
    F: FnOnce(u16, String) -> ClientError,
{
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!("Backend returned HTTP {}: {}", status, body);
        return Err(on_status(status.as_u16(), body));
    }

    Ok(serde_json::from_str(&body)?)
}

impl std::fmt::Debug for BuildClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildClient")
            .field("config", &self.config)
            .finish()
    }
}
