//! Client configuration.
//!
//! Nothing here is validated against the network: a bad token or base URL
//! only surfaces when the first request is attempted.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::DEFAULT_TIMEOUT;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.volleyhooks.com";

pub const ENV_API_TOKEN: &str = "VOLLEY_API_TOKEN";
pub const ENV_BASE_URL: &str = "VOLLEY_BASE_URL";
pub const ENV_ORGANIZATION_ID: &str = "VOLLEY_ORGANIZATION_ID";
pub const ENV_TIMEOUT_SECS: &str = "VOLLEY_TIMEOUT_SECS";

/// Settings used to construct a [`VolleyClient`](crate::VolleyClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: String,
    /// Sent as `X-Organization-ID` on every authenticated request when set.
    pub organization_id: Option<u64>,
    /// Whole-request timeout for the default transport.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            organization_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read configuration from `VOLLEY_*` environment variables.
    ///
    /// `VOLLEY_API_TOKEN` is required; `VOLLEY_BASE_URL`,
    /// `VOLLEY_ORGANIZATION_ID` and `VOLLEY_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_token = lookup(ENV_API_TOKEN)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config(format!("{ENV_API_TOKEN} is not set")))?;
        let mut config = Self::new(api_token);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|url| !url.is_empty()) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_ORGANIZATION_ID).filter(|id| !id.is_empty()) {
            let id = raw
                .parse()
                .map_err(|e| Error::Config(format!("{ENV_ORGANIZATION_ID}={raw:?}: {e}")))?;
            config.organization_id = Some(id);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|secs| !secs.is_empty()) {
            let secs: u64 = raw
                .parse()
                .map_err(|e| Error::Config(format!("{ENV_TIMEOUT_SECS}={raw:?}: {e}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
