//! JSON-RPC envelope types
//!
//! Request serialization and response interpretation for the two methods the
//! relay understands. The relay's `result` is heterogeneous, so it is resolved
//! once into [`RemoteCallResult`] and matched on from there.

use crate::error::KgbError;
use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// Method name for free-text relays
pub const RELAY_MESSAGE: &str = "relay_message";

/// Method name for structured commit notifications
pub const COMMIT_V4: &str = "commit_v4";

/// Correlation id sent with every request. Calls are unary, so it is never matched.
pub const REQUEST_ID: u64 = 0;

/// Result strings the relay uses to signal success.
const SUCCESS_MARKERS: [&str; 2] = ["OK", ""];

#[derive(Serialize)]
struct RpcRequest<'a, P: ?Sized> {
    method: &'a str,
    params: &'a P,
    id: u64,
}

/// Serialize a request envelope into the bytes that will be signed and sent.
///
/// `params` must serialize to a JSON array in the remote procedure's parameter order.
pub(crate) fn encode_request<P>(method: &str, params: &P) -> Result<Vec<u8>>
where
    P: Serialize + ?Sized,
{
    if method.is_empty() {
        return Err(KgbError::InvalidRequest("method name is empty".to_string()));
    }

    serde_json::to_vec(&RpcRequest {
        method,
        params,
        id: REQUEST_ID,
    })
    .map_err(|e| KgbError::InvalidRequest(e.to_string()))
}

/// Decode a response body, surfacing a non-null `error` member as [`KgbError::Remote`].
pub(crate) fn decode_response(body: &[u8]) -> Result<RemoteCallResult> {
    let value: Value = serde_json::from_slice(body)?;
    let mut members = match value {
        Value::Object(members) => members,
        other => {
            return Err(KgbError::Decode(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    match members.remove("error") {
        Some(Value::Null) | None => {}
        Some(err) => return Err(KgbError::Remote(err)),
    }

    Ok(members.remove("result").into())
}

/// The `result` member of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCallResult {
    /// A string result, usually a success marker
    Marker(String),
    /// No `result` member, or `null`
    Absent,
    /// Any other JSON value
    Other(Value),
}

impl From<Option<Value>> for RemoteCallResult {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RemoteCallResult::Absent,
            Some(Value::String(s)) => RemoteCallResult::Marker(s),
            Some(other) => RemoteCallResult::Other(other),
        }
    }
}

impl RemoteCallResult {
    /// Whether this result is one of the relay's success markers (`"OK"` or `""`)
    pub fn is_success(&self) -> bool {
        matches!(self, RemoteCallResult::Marker(s) if SUCCESS_MARKERS.contains(&s.as_str()))
    }

    /// Convert back into the raw JSON value
    pub fn into_value(self) -> Value {
        match self {
            RemoteCallResult::Marker(s) => Value::String(s),
            RemoteCallResult::Absent => Value::Null,
            RemoteCallResult::Other(v) => v,
        }
    }

    /// Succeed on a success marker, otherwise report a protocol violation for `method`
    pub fn expect_success(self, method: &str) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(KgbError::ProtocolViolation {
                method: method.to_string(),
                result: self.into_value(),
            })
        }
    }
}
