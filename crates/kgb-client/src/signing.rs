//! Request signing for the `X-KGB-Auth` header.

use sha1::{Digest, Sha1};

/// Compute the `X-KGB-Auth` value for a request body.
///
/// The digest is `sha1_hex(shared_secret + project_id + body)`, where `body`
/// must be the exact bytes put on the wire.
pub fn sign_request(shared_secret: &str, project_id: &str, body: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(shared_secret.as_bytes());
    hasher.update(project_id.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}
