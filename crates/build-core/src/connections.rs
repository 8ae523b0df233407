//! OAuth providers and per-service connection status.
//!
//! The backend issues tokens per provider; the front end shows connections
//! per service. One provider token covers several services (a Google token
//! covers Gmail, Drive, Docs, ...).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

/// OAuth providers the backend can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Microsoft,
    Atlassian,
    Slack,
    Notion,
    Github,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 6] = [
        Self::Google,
        Self::Microsoft,
        Self::Atlassian,
        Self::Slack,
        Self::Notion,
        Self::Github,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Atlassian => "atlassian",
            Self::Slack => "slack",
            Self::Notion => "notion",
            Self::Github => "github",
        }
    }

    /// Services enabled by a token from this provider.
    pub fn services(&self) -> &'static [&'static str] {
        match self {
            Self::Google => &[
                "gmail",
                "google-drive",
                "google-docs",
                "google-sheets",
                "google-chat",
                "google-calendar",
            ],
            Self::Microsoft => &["outlook", "teams", "sharepoint"],
            Self::Atlassian => &["jira", "confluence"],
            Self::Slack => &["slack"],
            Self::Notion => &["notion"],
            Self::Github => &["github"],
        }
    }

    /// Provider that authorizes the given service (or provider) id.
    pub fn for_service(service: &str) -> Option<Self> {
        if let Ok(provider) = service.parse() {
            return Some(provider);
        }
        Self::ALL
            .into_iter()
            .find(|provider| provider.services().contains(&service))
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| CoreError::UnknownProvider(s.to_string()))
    }
}

/// Which tokens to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderScope {
    One(OAuthProvider),
    All,
}

impl ProviderScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One(provider) => provider.as_str(),
            Self::All => "all",
        }
    }
}

impl Serialize for ProviderScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A stored provider token as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    pub provider: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Connection status of a single service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub email: Option<String>,
    pub expires_at: Option<String>,
    pub last_sync: Option<String>,
}

/// Connection status keyed by service id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionMap {
    services: BTreeMap<String, ConnectionStatus>,
}

impl ConnectionMap {
    /// Expand provider tokens into per-service entries.
    ///
    /// Tokens for unknown providers are skipped.
    pub fn from_tokens(tokens: &[TokenUser]) -> Self {
        let mut map = Self::default();
        for token in tokens {
            let Ok(provider) = token.provider.parse::<OAuthProvider>() else {
                tracing::debug!(provider = %token.provider, "skipping token for unknown provider");
                continue;
            };
            for service in provider.services() {
                map.services.insert(
                    service.to_string(),
                    ConnectionStatus {
                        connected: true,
                        email: token.user_email.clone(),
                        expires_at: token.expires_at.clone(),
                        last_sync: token.updated_at.clone(),
                    },
                );
            }
        }
        map
    }

    pub fn get(&self, service: &str) -> Option<&ConnectionStatus> {
        self.services.get(service)
    }

    pub fn is_connected(&self, service: &str) -> bool {
        self.get(service).is_some_and(|s| s.connected)
    }

    /// Mark every service of a provider as disconnected.
    pub fn disconnect(&mut self, provider: OAuthProvider) {
        for service in provider.services() {
            self.services
                .insert(service.to_string(), ConnectionStatus::default());
        }
    }

    /// Connected service ids, sorted.
    pub fn connected_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|(_, status)| status.connected)
            .map(|(service, _)| service.as_str())
            .collect()
    }
}
