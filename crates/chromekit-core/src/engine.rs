//! Top-level orchestration for one single-shot invocation (spec.md §6): CDP
//! discovery, target attach, command dispatch through the step runner, and
//! the wire-level response shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use chromekit_cdp::{close_target, create_target, discover_target, list_targets, CdpError, Session};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::page::{FrameSelector, Page};
use crate::refs::RefAllocator;
use crate::steps::{run_step, Diff, Step, StepContext, StepOutcome};

/// One step's outcome on the wire (spec.md §6 response shape): its result
/// (or error) plus an optional diff for visual steps.
#[derive(Debug, Serialize)]
pub struct StepResult {
    #[serde(rename = "type")]
    pub step_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::error::WireError>,
}

/// A command document: an ordered list of steps run against one attached
/// tab, aborting on first failure (spec.md §1 Non-goals — no whole-session
/// retry).
#[derive(Debug, Deserialize)]
pub struct Command {
    pub steps: Vec<Step>,
}

/// The full response to one command document.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub results: Vec<StepResult>,
    /// `true` only if every step in `results` succeeded.
    pub ok: bool,
}

/// Owns one attached tab's live state across a command's steps: the CDP
/// session, the page controller, the per-frame ref allocator, and the most
/// recent snapshot (the "Context Object" of spec.md §3).
pub struct Engine {
    page: Page,
    allocator: RefAllocator,
    config: EngineConfig,
}

impl Engine {
    /// Discover a target per `config.tab` (or the first page target),
    /// connect a CDP session to it, and attach the Page Controller.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cdp`] if discovery, connection, or attach
    /// fails.
    pub async fn connect(config: EngineConfig) -> EngineResult<Self> {
        let target = discover_target(&config.host, config.port, config.tab.as_deref())
            .await
            .map_err(EngineError::Cdp)?;
        let session = Session::connect(&target.web_socket_debugger_url)
            .await
            .map_err(EngineError::Cdp)?;
        let page = Page::attach(Arc::new(session), target.id).await?;
        let allocator = RefAllocator::new("0");
        Ok(Self { page, allocator, config })
    }

    /// Run every step in `command` in order, stopping at the first failure
    /// (spec.md §1 Non-goals: no whole-session retry).
    pub async fn run_command(&mut self, command: Command) -> CommandResponse {
        let mut results = Vec::with_capacity(command.steps.len());
        let mut last_snapshot = None;
        let mut current_frame = FrameSelector::Main;
        let mut ok = true;

        for step in &command.steps {
            if let Some(outcome) = self.dispatch_tab_step(step).await {
                match outcome {
                    Ok(result) => {
                        results.push(StepResult { step_type: step.type_name(), result: Some(result), diff: None, error: None });
                    }
                    Err(error) => {
                        ok = false;
                        results.push(StepResult {
                            step_type: step.type_name(),
                            result: None,
                            diff: None,
                            error: Some(error.to_wire()),
                        });
                        break;
                    }
                }
                continue;
            }

            let mut ctx = StepContext {
                page: &self.page,
                allocator: &mut self.allocator,
                last_snapshot: last_snapshot.take(),
                viewport_width: 0.0,
                viewport_height: 0.0,
                poll_interval: self.config.poll_interval,
                command_timeout: self.config.command_timeout,
                spa_nav_poll_window: self.config.spa_nav_poll_window,
                current_frame: current_frame.clone(),
            };

            let outcome = run_step(&mut ctx, step).await;
            last_snapshot = ctx.last_snapshot;
            current_frame = ctx.current_frame;

            match outcome {
                Ok(StepOutcome { result, diff }) => {
                    results.push(StepResult {
                        step_type: step.type_name(),
                        result: Some(result),
                        diff,
                        error: None,
                    });
                }
                Err(error) => {
                    ok = false;
                    results.push(StepResult {
                        step_type: step.type_name(),
                        result: None,
                        diff: None,
                        error: Some(error.to_wire()),
                    });
                    break;
                }
            }
        }

        CommandResponse { results, ok }
    }

    /// Run a single ad hoc step outside a [`Command`] document, for callers
    /// that just want one action's result (used by tests and the `chromekit`
    /// quick-start doc example).
    ///
    /// # Errors
    ///
    /// Returns whatever error the step itself produces.
    pub async fn run_step(&mut self, step: Value) -> EngineResult<Value> {
        let step: Step = serde_json::from_value(step).map_err(|e| EngineError::Cdp(CdpError::Json(e)))?;
        if let Some(outcome) = self.dispatch_tab_step(&step).await {
            return outcome;
        }
        let mut ctx = StepContext {
            page: &self.page,
            allocator: &mut self.allocator,
            last_snapshot: None,
            viewport_width: 0.0,
            viewport_height: 0.0,
            poll_interval: self.config.poll_interval,
            command_timeout: self.config.command_timeout,
            spa_nav_poll_window: self.config.spa_nav_poll_window,
            current_frame: FrameSelector::Main,
        };
        let outcome = run_step(&mut ctx, &step).await?;
        Ok(outcome.result)
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Handle the four multi-tab step types, which need to own more than one
    /// `Page`/`Session` at once — a shape no other step requires (see
    /// `DESIGN.md`). Returns `None` for any other step, leaving it to the
    /// ordinary step runner.
    async fn dispatch_tab_step(&mut self, step: &Step) -> Option<EngineResult<Value>> {
        match step {
            Step::ListTabs => Some(self.list_tabs().await),
            Step::CloseTab { tab } => Some(self.close_tab(tab.as_deref()).await),
            Step::NewTab { url } => Some(self.switch_to_new_tab(url.as_deref()).await),
            Step::SwitchTab { tab } => Some(self.switch_tab(tab).await),
            _ => None,
        }
    }

    async fn list_tabs(&self) -> EngineResult<Value> {
        let targets = list_targets(&self.config.host, self.config.port).await.map_err(EngineError::Cdp)?;
        let tabs: Vec<Value> = targets
            .into_iter()
            .filter(|t| t.target_type == "page")
            .map(|t| {
                json!({
                    "id": t.id,
                    "title": t.title,
                    "url": t.url,
                    "active": t.id == self.page.target_id(),
                })
            })
            .collect();
        Ok(Value::Array(tabs))
    }

    async fn close_tab(&mut self, tab: Option<&str>) -> EngineResult<Value> {
        let target_id = tab.unwrap_or_else(|| self.page.target_id()).to_string();
        close_target(&self.config.host, self.config.port, &target_id)
            .await
            .map_err(EngineError::Cdp)?;
        Ok(json!({ "closed": target_id }))
    }

    async fn switch_to_new_tab(&mut self, url: Option<&str>) -> EngineResult<Value> {
        let target = create_target(&self.config.host, self.config.port, url).await.map_err(EngineError::Cdp)?;
        self.attach(&target.id).await?;
        Ok(json!({ "id": target.id, "url": target.url }))
    }

    async fn switch_tab(&mut self, tab: &str) -> EngineResult<Value> {
        self.attach(tab).await?;
        Ok(json!({ "id": tab }))
    }

    /// Reattach to a different target, replacing the currently held page and
    /// resetting the ref allocator (refs are scoped to one tab's snapshot
    /// lineage, spec.md §3).
    async fn attach(&mut self, target_id: &str) -> EngineResult<()> {
        let target = discover_target(&self.config.host, self.config.port, Some(target_id))
            .await
            .map_err(EngineError::Cdp)?;
        let session = Session::connect(&target.web_socket_debugger_url).await.map_err(EngineError::Cdp)?;
        self.page = Page::attach(Arc::new(session), target.id).await?;
        self.allocator = RefAllocator::new("0");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, WireError};

    #[test]
    fn successful_step_result_omits_error_and_diff_on_the_wire() {
        let result = StepResult { step_type: "click", result: Some(json!({"clicked": true})), diff: None, error: None };
        let rendered = serde_json::to_value(&result).unwrap();
        assert_eq!(rendered, json!({ "type": "click", "result": { "clicked": true } }));
    }

    #[test]
    fn failed_step_result_carries_the_wire_error_and_omits_result() {
        let result = StepResult {
            step_type: "click",
            result: None,
            diff: None,
            error: Some(WireError { kind: ErrorKind::Element, message: "no such element".to_string() }),
        };
        let rendered = serde_json::to_value(&result).unwrap();
        assert!(rendered.get("result").is_none());
        assert_eq!(rendered["error"]["message"], "no such element");
    }

    #[test]
    fn command_response_ok_reflects_whether_any_step_failed() {
        let all_ok = CommandResponse {
            results: vec![StepResult { step_type: "goto", result: Some(Value::Null), diff: None, error: None }],
            ok: true,
        };
        assert!(all_ok.ok);

        let one_failed = CommandResponse {
            results: vec![StepResult {
                step_type: "click",
                result: None,
                diff: None,
                error: Some(WireError { kind: ErrorKind::Element, message: "gone".to_string() }),
            }],
            ok: false,
        };
        assert!(!one_failed.ok);
    }

    #[test]
    fn command_deserializes_a_step_list() {
        let doc = json!({ "steps": [{ "type": "snapshot" }, { "type": "getUrl" }] });
        let command: Command = serde_json::from_value(doc).unwrap();
        assert_eq!(command.steps.len(), 2);
        assert_eq!(command.steps[0].type_name(), "snapshot");
        assert_eq!(command.steps[1].type_name(), "getUrl");
    }
}
