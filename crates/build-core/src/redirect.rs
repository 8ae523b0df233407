//! Post-OAuth redirect query contract.
//!
//! After an OAuth round trip the backend redirects to the app with
//! `auth=success|error` and optionally `view=connections`. The parameters are
//! read once and then stripped from the URL (replace, not push).

use tracing::warn;
use url::form_urlencoded;

use crate::error::CoreError;

/// Outcome of an OAuth authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Error,
}

impl std::str::FromStr for AuthOutcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(CoreError::InvalidAuthOutcome(other.to_string())),
        }
    }
}

/// Parameters read from a redirect URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub auth: Option<AuthOutcome>,
    pub view: Option<String>,
}

impl RedirectParams {
    /// Read the parameters from a full URL or a bare query string.
    pub fn from_url(url: &str) -> Self {
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None if url.contains('=') => url,
            None => return Self::default(),
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "auth" => match value.parse() {
                    Ok(outcome) => params.auth = Some(outcome),
                    Err(e) => warn!("ignoring redirect parameter: {}", e),
                },
                "view" => params.view = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Whether the app should switch to the connections view.
    pub fn navigate_to_connections(&self) -> bool {
        self.auth == Some(AuthOutcome::Success) || self.view.as_deref() == Some("connections")
    }

    /// Whether there is anything to act on.
    pub fn is_empty(&self) -> bool {
        self.auth.is_none() && self.view.is_none()
    }
}

/// The URL without its query string and fragment.
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_success_navigates() {
        let params = RedirectParams::from_url("https://app.example.com/?auth=success");
        assert_eq!(params.auth, Some(AuthOutcome::Success));
        assert!(params.navigate_to_connections());
    }

    #[test]
    fn test_view_connections_navigates() {
        let params = RedirectParams::from_url("/?auth=error&view=connections");
        assert_eq!(params.auth, Some(AuthOutcome::Error));
        assert!(params.navigate_to_connections());
    }

    #[test]
    fn test_auth_error_alone_does_not_navigate() {
        let params = RedirectParams::from_url("auth=error");
        assert!(!params.navigate_to_connections());
    }

    #[test]
    fn test_no_query() {
        let params = RedirectParams::from_url("https://app.example.com/dashboard");
        assert!(params.is_empty());
    }

    #[test]
    fn test_unknown_auth_value_ignored() {
        let params = RedirectParams::from_url("/?auth=maybe&view=connections");
        assert!(params.auth.is_none());
        assert_eq!(params.view.as_deref(), Some("connections"));
    }

    #[test]
    fn test_encoded_values_are_decoded() {
        let params = RedirectParams::from_url("/?view=connections%20page#frag");
        assert_eq!(params.view.as_deref(), Some("connections page"));
        assert!(!params.navigate_to_connections());
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://app.example.com/home?auth=success&view=connections"),
            "https://app.example.com/home"
        );
        assert_eq!(strip_query("/home#top"), "/home");
        assert_eq!(strip_query("/home"), "/home");
    }
}
