//! Low-level Chrome DevTools Protocol transport and session multiplexer.
//!
//! This crate owns exactly one concern: turning a raw WebSocket connection to
//! a Chrome target into an async `send(method, params) -> result | error`
//! call together with a subscribable stream of unsolicited CDP events. It
//! knows nothing about pages, frames, accessibility trees, or steps — those
//! live in `chromekit-core`.
//!
//! ```no_run
//! use chromekit_cdp::{discover_target, Session};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), chromekit_cdp::CdpError> {
//! let target = discover_target("localhost", 9222, None).await?;
//! let session = Session::connect(&target.web_socket_debugger_url).await?;
//! let result: serde_json::Value = session
//!     .send("Runtime.evaluate", Some(json!({ "expression": "1 + 1" })))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod error;
pub mod session;
pub mod transport;

pub use discovery::{close_target, create_target, discover_target, list_targets, TargetInfo};
pub use error::CdpError;
pub use session::{Session, SessionEvent};
pub use transport::{CdpEvent, CdpMessage, CdpRequest, CdpResponse, CdpResponseError};
