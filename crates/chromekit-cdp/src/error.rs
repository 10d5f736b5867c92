//! Error taxonomy for the transport and session layer.
//!
//! This maps onto the *Transport* and *Protocol* categories of the wider
//! error taxonomy; `chromekit-core` adds the Validation/Element/Navigation/
//! Assertion categories on top and wraps this enum for Transport/Protocol
//! failures.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the CDP transport and session multiplexer.
#[derive(Error, Debug)]
pub enum CdpError {
    /// The CDP method returned `{error: {code, message}}`.
    #[error("CDP protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// CDP returned `{error: {message: "Cannot find context with specified id"}}`
    /// or an equivalent "no frame"/"no node" error indicating the document the
    /// call targeted was torn down, typically by a navigation. Recognised
    /// specifically because callers performing a click interpret it as
    /// "the click succeeded and navigated the page" rather than a failure.
    #[error("execution context was destroyed (page likely navigated): {0}")]
    ContextDestroyed(String),

    /// The WebSocket transport closed or the target detached. Fatal for the
    /// session: every pending request is failed with this error.
    #[error("CDP transport closed")]
    ConnectionLost,

    /// Failed to establish the WebSocket connection in the first place.
    #[error("failed to connect to {0}: {1}")]
    ConnectionFailed(String, String),

    /// A per-request deadline elapsed before a reply arrived.
    #[error("no reply after {0:?}")]
    Timeout(Duration),

    /// Discovery of the WebSocket URL from the HTTP `/json` endpoint failed.
    #[error("failed to discover target at {url}: {reason}")]
    DiscoveryFailed { url: String, reason: String },

    /// The `endpoint_url` given to discovery was not a usable http(s)/ws(s) URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpointUrl(String),

    /// Connecting to the discovery endpoint timed out.
    #[error("connection to {0} timed out")]
    ConnectionTimeout(String),

    /// Lower-level HTTP failure while talking to the discovery endpoint.
    #[error("HTTP request failed: {0}")]
    HttpRequestFailed(String),

    /// Failed to serialize a request or deserialize a reply.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CdpError {
    /// Recognise Chrome's "context destroyed" family of protocol errors.
    ///
    /// Chrome reports this as a plain `Protocol` error with a message that
    /// names the missing context, node, or execution context rather than as
    /// a distinct error code, so detection is by substring.
    #[must_use]
    pub fn classify_protocol(code: i64, message: String) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("cannot find context with specified id")
            || lower.contains("execution context was destroyed")
            || lower.contains("cannot find node with given id")
        {
            Self::ContextDestroyed(message)
        } else {
            Self::Protocol { code, message }
        }
    }

    /// True for the one protocol error callers performing a write action are
    /// allowed to treat as "succeeded, and the page navigated".
    #[must_use]
    pub const fn is_context_destroyed(&self) -> bool {
        matches!(self, Self::ContextDestroyed(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::ConnectionLost,
            other => Self::ConnectionFailed(String::new(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_context_destroyed_by_message() {
        let err = CdpError::classify_protocol(
            -32000,
            "Cannot find context with specified id".to_string(),
        );
        assert!(err.is_context_destroyed());
    }

    #[test]
    fn classifies_ordinary_protocol_errors() {
        let err = CdpError::classify_protocol(-32602, "Invalid parameters".to_string());
        assert!(!err.is_context_destroyed());
        assert!(matches!(err, CdpError::Protocol { code: -32602, .. }));
    }
}
