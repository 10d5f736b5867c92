//! The Page Controller (spec.md §4.2): owns the current CDP execution
//! context, drives navigation, and evaluates expressions in the page or a
//! selected sub-frame.

mod bootstrap;

pub use bootstrap::{bootstrap_script, READ_SPA_NAV_FLAG_SCRIPT, RESET_SPA_NAV_FLAG_SCRIPT};

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use chromekit_cdp::{CdpError, Session, SessionEvent};

use crate::error::{EngineError, EngineResult};

/// Condition `goto`/`reload` wait for before returning (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum WaitUntil {
    Commit,
    DomContentLoaded,
    #[default]
    Load,
    NetworkIdle,
}

/// Identifies an execution context within the target: the main document, or
/// a specific iframe (spec.md §3 Frame Context).
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub context_id: i64,
    pub frame_id: String,
    pub url: String,
    pub is_cross_origin: bool,
}

/// Selects which frame a step's evaluation should target (spec.md §4.2).
#[derive(Debug, Clone)]
pub enum FrameSelector {
    Main,
    Top,
    Index(usize),
    Name(String),
    Selector(String),
}

/// One captured console entry, from either `Runtime.consoleAPICalled`
/// (`console.log`/`warn`/`error`/...) or `Log.entryAdded` (browser-level
/// warnings, e.g. deprecations and mixed-content) (spec.md §4.5 `console`).
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleMessage {
    pub level: String,
    pub text: String,
    pub source: String,
}

/// Owns the current frame context and drives navigation/evaluation for one
/// attached target.
pub struct Page {
    session: Arc<Session>,
    target_id: String,
    main_context: RwLock<Option<FrameContext>>,
    sub_contexts: RwLock<Vec<FrameContext>>,
    next_frame_ordinal: AtomicI64,
    current_url: RwLock<String>,
    console_messages: RwLock<Vec<ConsoleMessage>>,
    console_api_events: RwLock<SessionEvent>,
    log_events: RwLock<SessionEvent>,
}

impl Page {
    /// Attach to a target: enable `Page`/`Runtime` domains, install the
    /// bootstrap script, and observe the initial execution context.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cdp`] if any setup command fails.
    #[instrument(level = "info", skip(session))]
    pub async fn attach(session: Arc<Session>, target_id: String) -> EngineResult<Self> {
        // Subscribed before Runtime/Log are even enabled, so the broadcast
        // channel exists and buffers from the first possible event rather
        // than dropping anything fired before a `console` step first reads.
        let console_api_events = session.on("Runtime.consoleAPICalled").await;
        let log_events = session.on("Log.entryAdded").await;

        let page = Self {
            session,
            target_id,
            main_context: RwLock::new(None),
            sub_contexts: RwLock::new(Vec::new()),
            next_frame_ordinal: AtomicI64::new(0),
            current_url: RwLock::new(String::new()),
            console_messages: RwLock::new(Vec::new()),
            console_api_events: RwLock::new(console_api_events),
            log_events: RwLock::new(log_events),
        };

        page.session
            .send::<_, Value>("Page.enable", None::<Value>)
            .await?;
        page.session
            .send::<_, Value>("Runtime.enable", None::<Value>)
            .await?;
        page.session
            .send::<_, Value>("Log.enable", None::<Value>)
            .await?;

        page.install_bootstrap_script().await?;
        Ok(page)
    }

    async fn install_bootstrap_script(&self) -> EngineResult<()> {
        let frame_ordinal = self.next_frame_ordinal.fetch_add(1, Ordering::Relaxed);
        let script = bootstrap_script(&frame_ordinal.to_string());
        self.session
            .send::<_, Value>(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(json!({ "source": script })),
            )
            .await?;
        // Also run it immediately against the current document: the CDP
        // call above only affects documents created from here on.
        let _: Value = self
            .session
            .send("Runtime.evaluate", Some(json!({ "expression": script })))
            .await?;
        Ok(())
    }

    /// Navigate to `url` and wait for `wait_until`.
    ///
    /// Same-origin hash-only changes bypass full navigation per spec.md
    /// §4.2: when only the fragment differs, this sets `location.hash`
    /// directly instead of issuing `Page.navigate`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NavigationTimeout`] if `wait_until` does not
    /// settle in time, or [`EngineError::Cdp`] for transport/protocol
    /// failures.
    #[instrument(level = "info", skip(self))]
    pub async fn goto(&self, url: &str, wait_until: WaitUntil, timeout: Duration) -> EngineResult<()> {
        if let Some(hash_only_url) = self.hash_only_navigation(url).await {
            return self.navigate_hash_only(&hash_only_url).await;
        }

        self.session
            .send::<_, Value>("Page.navigate", Some(json!({ "url": url })))
            .await?;

        self.wait_for_load(wait_until, timeout).await?;
        self.invalidate_frame_context().await;
        self.install_bootstrap_script().await?;
        *self.current_url.write().await = url.to_string();
        Ok(())
    }

    async fn hash_only_navigation(&self, target_url: &str) -> Option<String> {
        let current = self.current_url.read().await.clone();
        if current.is_empty() {
            return None;
        }
        let current_parsed = url::Url::parse(&current).ok()?;
        let target_parsed = url::Url::parse(target_url).ok()?;
        let same_origin_and_path = current_parsed.scheme() == target_parsed.scheme()
            && current_parsed.host_str() == target_parsed.host_str()
            && current_parsed.port_or_known_default() == target_parsed.port_or_known_default()
            && current_parsed.path() == target_parsed.path()
            && current_parsed.query() == target_parsed.query();
        let differs_only_in_fragment = target_parsed.fragment() != current_parsed.fragment();
        (same_origin_and_path && differs_only_in_fragment)
            .then(|| target_parsed.fragment().unwrap_or("").to_string())
    }

    async fn navigate_hash_only(&self, fragment: &str) -> EngineResult<()> {
        debug!(fragment, "same-origin hash-only navigation, bypassing full reload");
        let expr = format!("location.hash = {};", json!(fragment));
        let _: Value = self
            .session
            .send("Runtime.evaluate", Some(json!({ "expression": expr })))
            .await?;
        // Give the browser a brief window to settle scroll position.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }

    async fn wait_for_load(&self, wait_until: WaitUntil, timeout: Duration) -> EngineResult<()> {
        let event_name = match wait_until {
            WaitUntil::Commit => "Page.frameStartedLoading",
            WaitUntil::DomContentLoaded => "Page.domContentEventFired",
            WaitUntil::Load => "Page.loadEventFired",
            WaitUntil::NetworkIdle => "Page.lifecycleEvent",
        };

        let mut subscription = self.session.on(event_name).await;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(EngineError::NavigationTimeout(timeout, event_name.to_string()));
            }

            let event = tokio::time::timeout(remaining, subscription.recv()).await;
            match event {
                Ok(Some(event)) => {
                    if wait_until != WaitUntil::NetworkIdle {
                        return Ok(());
                    }
                    if event
                        .params
                        .as_ref()
                        .and_then(|p| p.get("name"))
                        .and_then(Value::as_str)
                        == Some("networkIdle")
                    {
                        return Ok(());
                    }
                }
                Ok(None) => return Err(EngineError::Cdp(CdpError::ConnectionLost)),
                Err(_) => return Err(EngineError::NavigationTimeout(timeout, event_name.to_string())),
            }
        }
    }

    async fn invalidate_frame_context(&self) {
        *self.main_context.write().await = None;
        self.sub_contexts.write().await.clear();
    }

    /// Evaluate `expression` in the page's main frame context.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cdp`]; a CDP `context-destroyed` protocol error
    /// surfaces as [`chromekit_cdp::CdpError::ContextDestroyed`] rather than
    /// a generic protocol error.
    pub async fn evaluate<R: serde::de::DeserializeOwned>(&self, expression: &str) -> EngineResult<R> {
        self.evaluate_in_frame(expression, &FrameSelector::Main).await
    }

    /// Evaluate `expression` in the frame resolved by `selector`.
    ///
    /// # Errors
    ///
    /// See [`Page::evaluate`].
    #[instrument(level = "debug", skip(self, expression))]
    pub async fn evaluate_in_frame<R: serde::de::DeserializeOwned>(
        &self,
        expression: &str,
        selector: &FrameSelector,
    ) -> EngineResult<R> {
        let mut params = json!({
            "expression": expression,
            "returnByValue": true,
            "awaitPromise": true,
        });

        if let Some(context_id) = self.resolve_context_id(selector).await {
            params["contextId"] = json!(context_id);
        }

        let response: EvaluateResponse = self.session.send("Runtime.evaluate", Some(params)).await?;

        if let Some(exception) = response.exception_details {
            let message = exception.exception.description.unwrap_or(exception.text);
            if message.to_ascii_lowercase().contains("cannot find context") {
                return Err(EngineError::Cdp(CdpError::ContextDestroyed(message)));
            }
            return Err(EngineError::Cdp(CdpError::Protocol { code: 0, message }));
        }

        let value = response.result.value.unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| EngineError::Cdp(CdpError::Json(e)))
    }

    async fn resolve_context_id(&self, selector: &FrameSelector) -> Option<i64> {
        match selector {
            FrameSelector::Main | FrameSelector::Top => None,
            FrameSelector::Index(i) => self.sub_contexts.read().await.get(*i).map(|c| c.context_id),
            FrameSelector::Name(name) => self
                .sub_contexts
                .read()
                .await
                .iter()
                .find(|c| c.frame_id == *name)
                .map(|c| c.context_id),
            FrameSelector::Selector(css) => self.resolve_selector_frame(css).await,
        }
    }

    /// Resolve a CSS selector identifying an `<iframe>` in the main document
    /// to the sub-context whose `url` matches that iframe's content window,
    /// by evaluating against the main frame and matching on the observed
    /// [`FrameContext::url`].
    async fn resolve_selector_frame(&self, css_selector: &str) -> Option<i64> {
        let script = format!(
            r"(function() {{
                const el = document.querySelector({css_selector:?});
                if (!el || el.tagName !== 'IFRAME') return null;
                try {{ return el.contentWindow.location.href; }} catch (e) {{ return el.src || null; }}
            }})()"
        );
        let href: Option<String> = self.evaluate(&script).await.ok()?;
        let href = href?;
        self.sub_contexts.read().await.iter().find(|c| c.url == href).map(|c| c.context_id)
    }

    /// Whether `selector` currently resolves to a live frame (always `true`
    /// for [`FrameSelector::Main`]/[`FrameSelector::Top`]), for the `frame`
    /// step to validate before switching the context (spec.md §4.2, §6).
    #[must_use]
    pub async fn has_frame(&self, selector: &FrameSelector) -> bool {
        matches!(selector, FrameSelector::Main | FrameSelector::Top) || self.resolve_context_id(selector).await.is_some()
    }

    /// Record a newly observed execution context from a CDP
    /// `Runtime.executionContextCreated` event.
    pub async fn observe_execution_context(&self, context: FrameContext) {
        let mut main = self.main_context.write().await;
        if main.is_none() {
            *main = Some(context);
        } else {
            self.sub_contexts.write().await.push(context);
        }
    }

    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// The underlying CDP session, for executors that need domains beyond
    /// `Runtime.evaluate` (e.g. `Input.dispatchMouseEvent`).
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn current_url(&self) -> String {
        self.current_url.read().await.clone()
    }

    /// The main frame's current scroll offset, for the page hash (spec.md
    /// §3, §4.3).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cdp`] if the evaluation fails.
    pub async fn scroll_position(&self) -> EngineResult<(f64, f64)> {
        self.evaluate_in_frame("[window.scrollX, window.scrollY]", &FrameSelector::Main).await
    }

    /// Pull every `Runtime.consoleAPICalled`/`Log.entryAdded` event queued
    /// since the last drain into `console_messages`, without blocking past
    /// what is already buffered.
    async fn drain_console_events(&self) {
        const POLL: Duration = Duration::from_millis(1);

        loop {
            let mut subscription = self.console_api_events.write().await;
            match tokio::time::timeout(POLL, subscription.recv()).await {
                Ok(Some(event)) => {
                    drop(subscription);
                    if let Some(message) = parse_console_api_event(&event) {
                        self.console_messages.write().await.push(message);
                    }
                }
                _ => break,
            }
        }

        loop {
            let mut subscription = self.log_events.write().await;
            match tokio::time::timeout(POLL, subscription.recv()).await {
                Ok(Some(event)) => {
                    drop(subscription);
                    if let Some(message) = parse_log_entry_event(&event) {
                        self.console_messages.write().await.push(message);
                    }
                }
                _ => break,
            }
        }
    }

    /// The console messages captured so far (spec.md §4.5 `console`). When
    /// `clear` is set, the buffer is emptied after reading.
    pub async fn console_messages(&self, clear: bool) -> Vec<ConsoleMessage> {
        self.drain_console_events().await;
        if clear {
            std::mem::take(&mut *self.console_messages.write().await)
        } else {
            self.console_messages.read().await.clone()
        }
    }
}

fn parse_console_api_event(event: &chromekit_cdp::CdpEvent) -> Option<ConsoleMessage> {
    let params = event.params.as_ref()?;
    let level = params.get("type").and_then(Value::as_str).unwrap_or("log").to_string();
    let text = params
        .get("args")
        .and_then(Value::as_array)
        .map(|args| {
            args.iter()
                .map(|arg| {
                    arg.get("value")
                        .map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .or_else(|| arg.get("description").and_then(Value::as_str).map(ToString::to_string))
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    Some(ConsoleMessage { level, text, source: "console-api".to_string() })
}

fn parse_log_entry_event(event: &chromekit_cdp::CdpEvent) -> Option<ConsoleMessage> {
    let entry = event.params.as_ref()?.get("entry")?;
    let level = entry.get("level").and_then(Value::as_str).unwrap_or("info").to_string();
    let text = entry.get("text").and_then(Value::as_str).unwrap_or_default().to_string();
    let source = entry.get("source").and_then(Value::as_str).unwrap_or("other").to_string();
    Some(ConsoleMessage { level, text, source })
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    result: RemoteObjectValue,
    #[serde(rename = "exceptionDetails")]
    exception_details: Option<ExceptionDetails>,
}

#[derive(Debug, Deserialize)]
struct RemoteObjectValue {
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ExceptionDetails {
    text: String,
    exception: ExceptionObject,
}

#[derive(Debug, Deserialize)]
struct ExceptionObject {
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_until_default_is_load() {
        assert_eq!(WaitUntil::default(), WaitUntil::Load);
    }

    #[test]
    fn console_api_event_joins_string_args() {
        let event = chromekit_cdp::CdpEvent {
            method: "Runtime.consoleAPICalled".to_string(),
            params: Some(json!({ "type": "warn", "args": [{ "value": "disk low" }, { "value": 3 }] })),
            session_id: None,
        };
        let message = parse_console_api_event(&event).unwrap();
        assert_eq!(message.level, "warn");
        assert_eq!(message.text, "disk low 3");
        assert_eq!(message.source, "console-api");
    }

    #[test]
    fn console_api_event_without_params_is_ignored() {
        let event = chromekit_cdp::CdpEvent { method: "Runtime.consoleAPICalled".to_string(), params: None, session_id: None };
        assert!(parse_console_api_event(&event).is_none());
    }

    #[test]
    fn log_entry_event_extracts_level_text_and_source() {
        let event = chromekit_cdp::CdpEvent {
            method: "Log.entryAdded".to_string(),
            params: Some(json!({ "entry": { "level": "error", "text": "mixed content blocked", "source": "security" } })),
            session_id: None,
        };
        let message = parse_log_entry_event(&event).unwrap();
        assert_eq!(message.level, "error");
        assert_eq!(message.text, "mixed content blocked");
        assert_eq!(message.source, "security");
    }
}
