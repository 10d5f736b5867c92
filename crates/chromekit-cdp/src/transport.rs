//! Wire types for the CDP JSON protocol.
//!
//! Every outgoing request carries a fresh monotonically increasing `id`.
//! Every incoming frame is either a response correlated to a pending request
//! by that `id`, or an event (no `id`) that gets fanned out to subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An outgoing CDP command.
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A reply to a previously sent [`CdpRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<CdpResponseError>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// The `error` object embedded in a [`CdpResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponseError {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// An unsolicited CDP event: `{method, params}` with no `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpEvent {
    pub method: String,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Either shape a frame read off the wire can take.
///
/// `serde(untagged)` distinguishes them structurally: a frame with an `id`
/// field deserializes as `Response`, anything else as `Event`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
    Response(CdpResponse),
    Event(CdpEvent),
}

impl CdpMessage {
    /// True if this frame is the response for the given pending request id.
    #[must_use]
    pub fn is_response_for(&self, id: u64) -> bool {
        matches!(self, Self::Response(resp) if resp.id == id)
    }

    #[must_use]
    pub fn into_response(self) -> Option<CdpResponse> {
        match self {
            Self::Response(resp) => Some(resp),
            Self::Event(_) => None,
        }
    }

    #[must_use]
    pub fn into_event(self) -> Option<CdpEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Response(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserializes_as_response() {
        let raw = r#"{"id":7,"result":{"ok":true}}"#;
        let msg: CdpMessage = serde_json::from_str(raw).unwrap();
        assert!(msg.is_response_for(7));
        assert!(!msg.is_response_for(8));
    }

    #[test]
    fn event_deserializes_as_event() {
        let raw = r#"{"method":"Page.frameNavigated","params":{"frame":{}}}"#;
        let msg: CdpMessage = serde_json::from_str(raw).unwrap();
        let event = msg.into_event().expect("should be an event");
        assert_eq!(event.method, "Page.frameNavigated");
    }

    #[test]
    fn request_omits_null_fields() {
        let req = CdpRequest {
            id: 1,
            method: "Page.enable".to_string(),
            params: None,
            session_id: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("params"));
        assert!(!json.contains("sessionId"));
    }
}
