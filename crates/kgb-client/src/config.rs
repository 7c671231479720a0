//! Client configuration
//!
//! Connection settings can come from the environment (`KGB_URI`,
//! `KGB_PROJECT`, `KGB_PASSWORD`, `KGB_TIMEOUT_SECS`) or be built directly.

use crate::endpoint::Endpoint;
use crate::error::KgbError;
use crate::session::AuthenticatedSession;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Address used when `KGB_URI` is not set
pub const DEFAULT_URI: &str = "http://localhost:5391";

/// Environment variables read by [`ClientConfig::from_env`]
pub const ENV_URI: &str = "KGB_URI";
pub const ENV_PROJECT: &str = "KGB_PROJECT";
pub const ENV_PASSWORD: &str = "KGB_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "KGB_TIMEOUT_SECS";

/// KGB connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay base address
    pub uri: String,
    /// Project id registered with the relay
    pub project: String,
    /// Project password (shared secret)
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Per-request timeout; `None` leaves the HTTP client default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("uri", &self.uri)
            .field("project", &self.project)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new config from environment variables
    ///
    /// Fails if `KGB_TIMEOUT_SECS` is set but is not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config for a specific relay and project
    pub fn new(uri: &str, project: &str, password: &str) -> Self {
        ClientConfig {
            uri: uri.to_string(),
            project: project.to_string(),
            password: password.to_string(),
            timeout_secs: None,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = lookup(ENV_TIMEOUT_SECS)
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(ClientConfig {
            uri: lookup(ENV_URI).unwrap_or_else(|| DEFAULT_URI.to_string()),
            project: lookup(ENV_PROJECT).unwrap_or_default(),
            password: lookup(ENV_PASSWORD).unwrap_or_default(),
            timeout_secs,
        })
    }

    /// Check that every required setting is present
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(KgbError::Config("relay URI is empty".to_string()));
        }
        if self.project.is_empty() {
            return Err(KgbError::Config(format!(
                "project id is empty (set {})",
                ENV_PROJECT
            )));
        }
        if self.password.is_empty() {
            return Err(KgbError::Config(format!(
                "password is empty (set {})",
                ENV_PASSWORD
            )));
        }
        Ok(())
    }

    /// Build an authenticated session from this config
    pub fn session(&self) -> Result<AuthenticatedSession> {
        self.validate()?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("kgb-client/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| KgbError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Endpoint::with_client(&self.uri, http_client).project(&self.project, &self.password))
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| {
        KgbError::Config(format!(
            "invalid {} {:?}: expected a whole number of seconds",
            ENV_TIMEOUT_SECS, raw
        ))
    })
}
