//! Remote backend configuration.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::info;

/// Default hosted-backend endpoint.
pub const DEFAULT_REMOTE_URL: &str = "http://127.0.0.1:8700";

/// Default request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable for the backend base URL.
pub const ENV_REMOTE_URL: &str = "FOLIO_REMOTE_URL";

/// Environment variable for the bearer token.
pub const ENV_REMOTE_TOKEN: &str = "FOLIO_REMOTE_TOKEN";

/// Environment variable for the request timeout in seconds.
pub const ENV_REMOTE_TIMEOUT: &str = "FOLIO_REMOTE_TIMEOUT_SECS";

/// Shared configuration for the hosted-backend clients.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    /// Configuration pointing at the given base URL, with defaults
    /// otherwise.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(ENV_REMOTE_URL).unwrap_or_else(|_| DEFAULT_REMOTE_URL.to_string());
        let api_token = std::env::var(ENV_REMOTE_TOKEN).ok().filter(|t| !t.is_empty());
        let timeout_secs = std::env::var(ENV_REMOTE_TIMEOUT)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        info!(base_url = %base_url, timeout_secs, "Initializing remote backend config");

        Self {
            base_url,
            api_token,
            timeout_secs,
        }
    }

    /// Build the HTTP client used by every backend call.
    pub(crate) fn client(&self) -> Client {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Absolute URL for an endpoint path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attach the bearer token, when configured.
    pub(crate) fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}
