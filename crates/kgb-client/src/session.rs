//! Authenticated project session
//!
//! All protocol behaviour lives here. Both public operations go through one
//! private `call` primitive, which signs the serialized request, posts it,
//! and interprets the response.

use crate::commit::CommitNotification;
use crate::endpoint::Endpoint;
use crate::error::KgbError;
use crate::rpc::{self, RemoteCallResult, COMMIT_V4, RELAY_MESSAGE};
use crate::signing::sign_request;
use crate::Result;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Header carrying the plaintext project id
pub const PROJECT_HEADER: &str = "X-KGB-Project";

/// Header carrying the request signature
pub const AUTH_HEADER: &str = "X-KGB-Auth";

/// A request body together with its `X-KGB-Auth` signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Exact bytes that are signed and sent
    pub body: Vec<u8>,
    /// Lowercase hex digest for the `X-KGB-Auth` header
    pub auth: String,
}

/// An [`Endpoint`] bound to a project id and password.
///
/// Holds no mutable state and can be shared freely between tasks.
#[derive(Clone)]
pub struct AuthenticatedSession {
    endpoint: Endpoint,
    project_id: String,
    shared_secret: String,
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

impl AuthenticatedSession {
    /// Bind `endpoint` to a project id and its password
    pub fn new(endpoint: Endpoint, project_id: &str, shared_secret: &str) -> Self {
        AuthenticatedSession {
            endpoint,
            project_id: project_id.to_string(),
            shared_secret: shared_secret.to_string(),
        }
    }

    /// Relay this session talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Project id sent in the `X-KGB-Project` header
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Relay a free-text message
    pub async fn relay_message(&self, message: &str) -> Result<()> {
        self.call(RELAY_MESSAGE, &[message])
            .await?
            .expect_success(RELAY_MESSAGE)
    }

    /// Send a structured commit notification
    pub async fn commit(&self, commit: &CommitNotification) -> Result<()> {
        self.call(COMMIT_V4, &[commit])
            .await?
            .expect_success(COMMIT_V4)
    }

    /// Serialize and sign a request without sending it
    ///
    /// `params` must serialize to a JSON array of positional arguments.
    pub fn sign<P>(&self, method: &str, params: &P) -> Result<SignedRequest>
    where
        P: Serialize + ?Sized,
    {
        let body = rpc::encode_request(method, params)?;
        let auth = sign_request(&self.shared_secret, &self.project_id, &body);
        Ok(SignedRequest { body, auth })
    }

    /// Invoke `method` on the relay and return its `result` member
    async fn call<P>(&self, method: &str, params: &P) -> Result<RemoteCallResult>
    where
        P: Serialize + ?Sized,
    {
        let project = HeaderValue::from_str(&self.project_id).map_err(|_| {
            KgbError::InvalidRequest(format!(
                "project id {:?} is not a valid header value",
                self.project_id
            ))
        })?;
        let SignedRequest { body, auth } = self.sign(method, params)?;
        let url = self.endpoint.rpc_url();

        debug!(
            method,
            project = %self.project_id,
            url = %url,
            body_len = body.len(),
            "Sending KGB request"
        );

        let response = self
            .endpoint
            .http_client()
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(PROJECT_HEADER, project)
            .header(AUTH_HEADER, auth)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(method, status = %status, "KGB relay returned HTTP error");
            // Drain the body so the connection can go back to the pool
            let _ = response.bytes().await;
            return Err(KgbError::Transport(status.to_string()));
        }

        let bytes = response.bytes().await?;
        let result = rpc::decode_response(&bytes);

        if let Err(KgbError::Remote(err)) = &result {
            warn!(method, error = %err, "KGB relay returned an error result");
        }

        result
    }
}
