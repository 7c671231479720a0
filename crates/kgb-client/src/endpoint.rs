//! Relay endpoint

use crate::session::AuthenticatedSession;

/// Path the relay serves JSON-RPC on, relative to the endpoint address
pub const JSON_RPC_PATH: &str = "/json-rpc";

/// A single KGB relay, identified by its base address.
///
/// Cloning is cheap; clones share the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Endpoint {
    address: String,
    http_client: reqwest::Client,
}

impl Endpoint {
    /// Create an endpoint using a default HTTP client
    pub fn new(address: &str) -> Self {
        Self::with_client(address, reqwest::Client::new())
    }

    /// Create an endpoint using a caller-configured HTTP client (timeouts, proxies, ...)
    pub fn with_client(address: &str, http_client: reqwest::Client) -> Self {
        Endpoint {
            address: address.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Base address, without a trailing slash
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Full URL requests are posted to
    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.address, JSON_RPC_PATH)
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Bind this endpoint to a project and its password
    pub fn project(&self, project_id: &str, shared_secret: &str) -> AuthenticatedSession {
        AuthenticatedSession::new(self.clone(), project_id, shared_secret)
    }
}
