//! KGB Client: authenticated JSON-RPC notifications for kgb-bot
//!
//! This crate speaks the protocol of the KGB notification relay
//! (<https://packages.debian.org/kgb-bot>): commit notifications and free-text
//! messages are posted as signed JSON-RPC requests and relayed to IRC.
//!
//! ```no_run
//! # async fn run() -> kgb_client::Result<()> {
//! let project = kgb_client::Endpoint::new("http://localhost:5391")
//!     .project("example-repo-id", "example-repo-password");
//!
//! project.relay_message("hi, y'all!").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication
//!
//! Every request carries `X-KGB-Project` and `X-KGB-Auth`, where the latter is
//! `sha1_hex(password + project_id + body)` over the exact body bytes sent.

pub mod commit;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod rpc;
pub mod session;
pub mod signing;

pub use commit::{Change, ChangeKind, CommitNotification};
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use error::KgbError;
pub use rpc::{RemoteCallResult, COMMIT_V4, RELAY_MESSAGE};
pub use session::{AuthenticatedSession, SignedRequest, AUTH_HEADER, PROJECT_HEADER};
pub use signing::sign_request;

/// Result type for kgb-client operations
pub type Result<T> = std::result::Result<T, KgbError>;
