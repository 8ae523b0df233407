//! Application context shared by every controller.

use std::sync::Arc;

use build_client::{AppConfig, BuildClient};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::controller::{BuildController, ControllerConfig};
use crate::error::ControllerError;

/// Configuration, backend client and root cancellation token.
///
/// Built once at startup and passed down explicitly.
pub struct AppContext {
    config: AppConfig,
    client: Arc<BuildClient>,
    shutdown: CancellationToken,
}

impl AppContext {
    /// Create a context from loaded configuration.
    pub fn new(config: AppConfig) -> Result<Self, ControllerError> {
        let client = BuildClient::new(config.client.clone())?;
        Ok(Self {
            config,
            client: Arc::new(client),
            shutdown: CancellationToken::new(),
        })
    }

    /// Load configuration from the environment and create a context.
    pub fn from_env() -> Result<Self, ControllerError> {
        let config = AppConfig::from_env()?;
        info!(backend = %config.client.base_url, "Loaded configuration");
        Self::new(config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared backend client.
    pub fn client(&self) -> Arc<BuildClient> {
        Arc::clone(&self.client)
    }

    /// Create a controller bound to this context's client.
    ///
    /// Shutting down the context cancels the controller.
    pub fn build_controller(&self) -> BuildController<BuildClient> {
        BuildController::new(
            self.client(),
            ControllerConfig::from_app(&self.config),
            self.shutdown.child_token(),
        )
    }

    /// Token cancelled on shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancel every controller created from this context.
    pub fn shutdown(&self) {
        info!("Shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
