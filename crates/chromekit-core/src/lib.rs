//! # chromekit-core
//!
//! A browser-automation engine that drives Chrome over the Chrome DevTools
//! Protocol and exposes a single-shot, JSON-in/JSON-out command interface.
//!
//! ## Overview
//!
//! - [`page`]: the Page Controller — navigation, frame contexts, evaluation.
//! - [`snapshot`]: the ARIA Snapshot & Ref System — accessibility tree
//!   capture, ref assignment, search, and text serialization.
//! - [`resolver`]: the Lazy Element Resolver — re-finds a live DOM element
//!   from a ref's stored metadata at the moment it's needed.
//! - [`executors`]: per-step-type actions (click, fill, keyboard, query,
//!   page functions).
//! - [`steps`]: the step registry and runner, including the around-step
//!   diffing protocol.
//! - [`engine`]: top-level orchestration tying the above into one
//!   invocation.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use chromekit_core::{Engine, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> chromekit_core::EngineResult<()> {
//!     let mut engine = Engine::connect(EngineConfig::default()).await?;
//!     let response = engine.run_step(serde_json::json!({ "type": "snapshot" })).await?;
//!     println!("{response}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod executors;
pub mod page;
pub mod refs;
pub mod resolver;
pub mod snapshot;
pub mod steps;

pub use config::EngineConfig;
pub use engine::{Command, CommandResponse, Engine, StepResult};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use refs::Ref;
