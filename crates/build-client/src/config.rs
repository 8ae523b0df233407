//! Configuration types for build-client.

use std::env;
use std::time::Duration;

use build_core::OAuthProvider;
use thiserror::Error;
use url::Url;

/// Default backend URL.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8081";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default interval between simulated progress ticks.
pub const DEFAULT_PROGRESS_TICK: Duration = Duration::from_millis(100);

/// Default user email sent when saving agents and chatting with them.
pub const DEFAULT_USER_EMAIL: &str = "user@example.com";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SUPABASE_URL environment variable is required")]
    MissingSupabaseUrl,

    #[error("SUPABASE_ANON_KEY environment variable is required")]
    MissingSupabaseKey,

    #[error("invalid URL in {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("invalid number in {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Configuration for connecting to the build backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "http://localhost:8081"), without trailing slash.
    pub base_url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Email identifying the user to the agents API.
    pub user_email: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_email: DEFAULT_USER_EMAIL.to_string(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the user email.
    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = email.into();
        self
    }

    /// `POST` here to create a build session.
    pub fn builds_url(&self) -> String {
        format!("{}/api/v1/builds", self.base_url)
    }

    /// `POST` here to continue a build session.
    pub fn continue_url(&self, build_id: &str) -> String {
        format!(
            "{}/api/v1/builds/{}/continue",
            self.base_url,
            urlencoding::encode(build_id)
        )
    }

    /// `POST` a multipart file here.
    pub fn upload_url(&self, build_id: &str) -> String {
        format!(
            "{}/api/v1/builds/{}/upload_file",
            self.base_url,
            urlencoding::encode(build_id)
        )
    }

    pub fn architect_url(&self) -> String {
        format!("{}/api/v1/agents/architect", self.base_url)
    }

    pub fn agents_url(&self) -> String {
        format!("{}/api/v1/agents", self.base_url)
    }

    pub fn agent_chat_url(&self, agent_id: &str) -> String {
        format!(
            "{}/api/v1/agents/{}/chat",
            self.base_url,
            urlencoding::encode(agent_id)
        )
    }

    pub fn auth_url(&self, provider: OAuthProvider) -> String {
        format!("{}/api/v1/auth/{}", self.base_url, provider)
    }

    pub fn tokens_list_url(&self) -> String {
        format!("{}/api/v1/auth/tokens/list", self.base_url)
    }

    pub fn clear_tokens_url(&self) -> String {
        format!("{}/api/v1/auth/clear-tokens", self.base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// Supabase project the analytics data lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub supabase: SupabaseConfig,
    /// Interval between simulated progress ticks.
    pub progress_tick: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BACKEND_URL` / `VITE_BACKEND_URL` | Build backend URL | `http://localhost:8081` |
    /// | `SUPABASE_URL` / `VITE_SUPABASE_URL` | Supabase project URL | (required) |
    /// | `SUPABASE_ANON_KEY` / `VITE_SUPABASE_ANON_KEY` | Supabase anon key | (required) |
    /// | `BUILD_REQUEST_TIMEOUT_SECS` | Per-request timeout | `60` |
    /// | `BUILD_PROGRESS_TICK_MS` | Progress tick interval | `100` |
    /// | `ARCHITECT_USER_EMAIL` | User email for agents API | `user@example.com` |
    ///
    /// Missing Supabase settings fail immediately.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, fallback: &str| {
            lookup(primary)
                .or_else(|| lookup(fallback))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url =
            var("BACKEND_URL", "VITE_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        if !is_http_url(&base_url) {
            return Err(ConfigError::InvalidUrl {
                name: "BACKEND_URL",
                value: base_url,
            });
        }

        let supabase_url =
            var("SUPABASE_URL", "VITE_SUPABASE_URL").ok_or(ConfigError::MissingSupabaseUrl)?;
        if !is_http_url(&supabase_url) {
            return Err(ConfigError::InvalidUrl {
                name: "SUPABASE_URL",
                value: supabase_url,
            });
        }
        let anon_key = var("SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY")
            .ok_or(ConfigError::MissingSupabaseKey)?;

        let request_timeout = parse_number(&lookup, "BUILD_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let progress_tick = parse_number(&lookup, "BUILD_PROGRESS_TICK_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PROGRESS_TICK);

        let user_email = lookup("ARCHITECT_USER_EMAIL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_EMAIL.to_string());

        Ok(Self {
            client: ClientConfig::new(base_url)
                .with_timeout(request_timeout)
                .with_user_email(user_email),
            supabase: SupabaseConfig {
                url: supabase_url,
                anon_key,
            },
            progress_tick,
        })
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

fn parse_number<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
