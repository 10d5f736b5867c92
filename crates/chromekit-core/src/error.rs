//! The engine's error taxonomy (spec.md §7): Validation, Transport, Protocol,
//! Element, Navigation, Assertion.
//!
//! `Transport`/`Protocol` are largely inherited from [`chromekit_cdp::CdpError`]
//! via `#[from]`; the remaining categories are specific to page-level and
//! step-level failures.

use chromekit_cdp::CdpError;
use serde::Serialize;
use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The step list failed registry validation before any Chrome
    /// interaction occurred.
    #[error("validation error: {0}")]
    Validation(String),

    /// A CDP transport- or protocol-level failure.
    #[error(transparent)]
    Cdp(#[from] CdpError),

    /// The target element could not be found by any resolution strategy.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A previously issued ref no longer resolves to a live element.
    #[error("stale ref {ref_str}: {suggestion}")]
    StaleRef { ref_str: String, suggestion: String },

    /// The element exists but cannot receive the requested action (e.g. a
    /// `fill` against a `<div>` with no `contenteditable`).
    #[error("element not editable: {0}")]
    NotEditable(String),

    /// The element exists but fails the actionability check (invisible,
    /// zero-size, or obscured).
    #[error("element not actionable: {0}")]
    NotActionable(String),

    /// A navigation wait (`waitUntil`) did not settle before its timeout.
    #[error("navigation timed out after {0:?} waiting for {1}")]
    NavigationTimeout(std::time::Duration, String),

    /// A user-declared `assert` step failed.
    #[error("assertion failed: {0}")]
    Assertion(String),
}

impl EngineError {
    /// Classify this error into the wire-level `kind` string of spec.md §7.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Cdp(CdpError::ContextDestroyed(_)) => ErrorKind::Protocol,
            Self::Cdp(
                CdpError::ConnectionLost
                | CdpError::ConnectionFailed(..)
                | CdpError::Timeout(_)
                | CdpError::ConnectionTimeout(_)
                | CdpError::HttpRequestFailed(_),
            ) => ErrorKind::Transport,
            Self::Cdp(_) => ErrorKind::Protocol,
            Self::ElementNotFound(_) | Self::StaleRef { .. } => ErrorKind::Element,
            Self::NotEditable(_) | Self::NotActionable(_) => ErrorKind::Element,
            Self::NavigationTimeout(..) => ErrorKind::Navigation,
            Self::Assertion(_) => ErrorKind::Assertion,
        }
    }

    /// True when this error carries Chrome's "context destroyed" signal.
    /// Per spec.md §7, a click-verification caller treats this as success
    /// plus navigation rather than propagating it.
    #[must_use]
    pub const fn is_context_destroyed(&self) -> bool {
        matches!(self, Self::Cdp(CdpError::ContextDestroyed(_)))
    }

    /// The wire-level `{error: {kind, message}}` shape of spec.md §7.
    #[must_use]
    pub fn to_wire(&self) -> WireError {
        WireError {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// The `kind` discriminant of the wire-level error object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    Transport,
    Protocol,
    Element,
    Navigation,
    Assertion,
}

/// The serialized `{kind, message}` error object attached to a failed step.
#[derive(Debug, Clone, Serialize)]
pub struct WireError {
    pub kind: ErrorKind,
    pub message: String,
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn context_destroyed_classifies_as_protocol_and_is_detected() {
        let err = EngineError::Cdp(CdpError::ContextDestroyed("gone".to_string()));
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.is_context_destroyed());
    }

    #[test]
    fn timeout_classifies_as_transport() {
        let err = EngineError::Cdp(CdpError::Timeout(Duration::from_secs(10)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn stale_ref_classifies_as_element() {
        let err = EngineError::StaleRef {
            ref_str: "f0s1e1".to_string(),
            suggestion: "take a new snapshot".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Element);
    }
}
