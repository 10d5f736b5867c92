//! The around-step protocol (spec.md §4.6): for visual steps, captures a
//! snapshot before and after the action and attaches a [`Diff`]; for every
//! step, resolves any `ref` argument through the snapshot's stored identity
//! and the Lazy Element Resolver before acting.

use std::time::Duration;

use serde_json::{json, Value};

use crate::error::{EngineError, EngineResult};
use crate::executors::{self, ClickButton, ClickOptions, KeyModifier};
use crate::page::{FrameSelector, Page, WaitUntil};
use crate::refs::{Ref, RefAllocator};
use crate::resolver;
use crate::snapshot::{AccessibilitySnapshot, DetailLevel, SearchQuery, SnapshotOptions, TextMatch};

use super::diff::{diff_snapshots, Diff};
use super::registry::step_metadata;
use super::Step;

/// Per-invocation state the runner needs across steps: the attached page,
/// the frame's ref allocator, the most recent snapshot (for ref → identity
/// lookup), and the configured timing defaults.
pub struct StepContext<'a> {
    pub page: &'a Page,
    pub allocator: &'a mut RefAllocator,
    pub last_snapshot: Option<AccessibilitySnapshot>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub poll_interval: Duration,
    pub command_timeout: Duration,
    pub spa_nav_poll_window: Duration,
    /// The frame subsequent steps evaluate in, set by the most recent
    /// `frame` step (spec.md §4.2, §6).
    pub current_frame: FrameSelector,
}

/// Result of running one step: its JSON result plus an optional diff for
/// visual steps.
#[derive(Debug)]
pub struct StepOutcome {
    pub result: Value,
    pub diff: Option<Diff>,
}

async fn resolve_selector(ctx: &StepContext<'_>, ref_str: &str) -> EngineResult<String> {
    let target = Ref::parse(ref_str).map_err(EngineError::Validation)?;
    let snapshot = ctx
        .last_snapshot
        .as_ref()
        .ok_or_else(|| EngineError::StaleRef { ref_str: ref_str.to_string(), suggestion: "take a snapshot first".to_string() })?;
    let identity = snapshot.identity_for(&target).ok_or_else(|| EngineError::StaleRef {
        ref_str: ref_str.to_string(),
        suggestion: "ref not present in the most recent snapshot; take a new one".to_string(),
    })?;
    resolver::resolve(ctx.page, identity).await?;
    Ok(identity.selector.clone())
}

fn parse_modifiers(names: &[String]) -> Vec<KeyModifier> {
    names
        .iter()
        .filter_map(|m| match m.as_str() {
            "Alt" => Some(KeyModifier::Alt),
            "Control" => Some(KeyModifier::Control),
            "ControlOrMeta" => Some(KeyModifier::ControlOrMeta),
            "Meta" => Some(KeyModifier::Meta),
            "Shift" => Some(KeyModifier::Shift),
            _ => None,
        })
        .collect()
}

/// Run `step` against `ctx`, applying the around-step snapshot/diff
/// protocol when the step's registry entry marks it visual.
///
/// # Errors
///
/// Returns whatever error the underlying executor or page operation
/// produces; visual steps propagate the action's error without attempting
/// the "after" snapshot.
pub async fn run_step(ctx: &mut StepContext<'_>, step: &Step) -> EngineResult<StepOutcome> {
    let metadata = step_metadata(step.type_name())
        .ok_or_else(|| EngineError::Validation(format!("unknown step type {}", step.type_name())))?;

    let before = if metadata.is_visual {
        Some(AccessibilitySnapshot::capture(ctx.page, ctx.allocator, false).await?)
    } else {
        None
    };

    let result = execute(ctx, step).await?;

    let diff = if let Some(before) = before {
        let after = AccessibilitySnapshot::capture(ctx.page, ctx.allocator, false).await?;
        let computed = diff_snapshots(before.root(), after.root());
        ctx.last_snapshot = Some(after);
        Some(computed)
    } else {
        None
    };

    Ok(StepOutcome { result, diff })
}

#[allow(clippy::too_many_lines)]
async fn execute(ctx: &mut StepContext<'_>, step: &Step) -> EngineResult<Value> {
    match step {
        Step::Goto { url, wait_until } => {
            ctx.page.goto(url, *wait_until, ctx.command_timeout).await?;
            Ok(json!({ "url": url }))
        }
        Step::Reload { wait_until } => {
            let url = ctx.page.current_url().await;
            ctx.page.goto(&url, *wait_until, ctx.command_timeout).await?;
            Ok(json!({ "url": url }))
        }
        Step::Sleep { ms } => {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
            Ok(Value::Null)
        }
        Step::Wait { selector, timeout_ms } => {
            let timeout = timeout_ms.map_or(ctx.command_timeout, Duration::from_millis);
            let Some(selector) = selector else {
                tokio::time::sleep(ctx.poll_interval).await;
                return Ok(Value::Null);
            };
            wait_for_selector(ctx.page, selector, ctx.poll_interval, timeout, &ctx.current_frame).await?;
            Ok(Value::Null)
        }
        Step::Click { element_ref, button, double_click, modifiers } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            let options = ClickOptions {
                button: match button.as_deref() {
                    Some("right") => ClickButton::Right,
                    Some("middle") => ClickButton::Middle,
                    _ => ClickButton::Left,
                },
                double_click: *double_click,
                modifiers: parse_modifiers(modifiers),
                spa_nav_poll_window: ctx.spa_nav_poll_window,
            };
            let navigated = executors::click(ctx.page, &selector, &options, &ctx.current_frame).await?;
            Ok(json!({ "navigated": navigated }))
        }
        Step::Fill { element_ref, text } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            executors::fill(ctx.page, &selector, text, &ctx.current_frame).await?;
            Ok(Value::Null)
        }
        Step::Press { key, modifiers } => {
            executors::press_key(ctx.page, key, &parse_modifiers(modifiers)).await?;
            Ok(Value::Null)
        }
        Step::Query { selector } => {
            let found = executors::query(ctx.page, selector, &ctx.current_frame).await?;
            serde_json::to_value(found).map_err(|e| EngineError::Cdp(e.into()))
        }
        Step::QueryAll { selector } => {
            let found = executors::query_all(ctx.page, selector, &ctx.current_frame).await?;
            serde_json::to_value(found).map_err(|e| EngineError::Cdp(e.into()))
        }
        Step::Inspect { element_ref } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            let found = executors::query(ctx.page, &selector, &ctx.current_frame).await?;
            serde_json::to_value(found).map_err(|e| EngineError::Cdp(e.into()))
        }
        Step::Scroll { element_ref, dx, dy } => scroll(ctx, element_ref.as_deref(), *dx, *dy).await,
        Step::Console { clear } => {
            let messages = ctx.page.console_messages(*clear).await;
            serde_json::to_value(json!({ "messages": messages })).map_err(|e| EngineError::Cdp(e.into()))
        }
        Step::Pdf { path } => Err(EngineError::Validation(format!(
            "pdf capture is an external collaborator concern (requested path {path:?})"
        ))),
        Step::Snapshot { detail, since } => {
            let explicit = true;
            let snapshot = AccessibilitySnapshot::capture(ctx.page, ctx.allocator, explicit).await?;
            let options = SnapshotOptions {
                detail: parse_detail(detail.as_deref()),
                since: *since,
                viewport_width: ctx.viewport_width,
                viewport_height: ctx.viewport_height,
            };
            let rendered = snapshot.render(&options);
            let text = snapshot.format(&options);
            let hash = snapshot.hash();
            ctx.last_snapshot = Some(snapshot);
            Ok(json!({ "text": text, "hash": hash, "unchanged": matches!(rendered, crate::snapshot::HashComparison::Unchanged) }))
        }
        Step::SnapshotSearch { text, pattern, role, near, exact, limit, context } => {
            let snapshot = ctx
                .last_snapshot
                .as_ref()
                .ok_or_else(|| EngineError::Validation("snapshotSearch requires a prior snapshot".to_string()))?;
            let query = SearchQuery {
                text: text.clone(),
                text_match: if *exact { TextMatch::Exact } else { TextMatch::Substring },
                pattern: pattern.clone(),
                role: role.clone(),
                near: near.clone(),
                context: *context,
                limit: *limit,
            };
            let hits = snapshot.search(&query).map_err(EngineError::Validation)?;
            serde_json::to_value(
                hits.into_iter()
                    .map(|h| json!({ "role": h.role, "name": h.name, "ref": h.ref_string, "ancestors": h.ancestor_roles }))
                    .collect::<Vec<_>>(),
            )
            .map_err(|e| EngineError::Cdp(e.into()))
        }
        Step::Hover { element_ref } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            hover(ctx.page, &selector, &ctx.current_frame).await
        }
        Step::Viewport { width, height } => {
            let _: Value = ctx
                .page
                .session()
                .send(
                    "Emulation.setDeviceMetricsOverride",
                    Some(json!({ "width": width, "height": height, "deviceScaleFactor": 1, "mobile": false })),
                )
                .await?;
            ctx.viewport_width = f64::from(*width);
            ctx.viewport_height = f64::from(*height);
            Ok(Value::Null)
        }
        Step::Cookies { set, clear } => cookies(ctx.page, set, *clear).await,
        Step::Back => {
            history_navigate(ctx.page, -1).await?;
            Ok(Value::Null)
        }
        Step::Forward => {
            history_navigate(ctx.page, 1).await?;
            Ok(Value::Null)
        }
        Step::WaitForNavigation { timeout_ms } => {
            let timeout = timeout_ms.map_or(ctx.command_timeout, Duration::from_millis);
            ctx.page.goto(&ctx.page.current_url().await, WaitUntil::Load, timeout).await.ok();
            Ok(Value::Null)
        }
        // Engine::dispatch_tab_step intercepts these before they ever reach
        // run_step, since they need to own more than one Page/Session at
        // once. Reaching here means a caller invoked run_step directly.
        Step::ListTabs | Step::CloseTab { .. } | Step::NewTab { .. } | Step::SwitchTab { .. } => {
            Err(EngineError::Validation(format!(
                "{} must be dispatched through Engine, not run_step directly",
                step.type_name()
            )))
        }
        Step::SelectText { element_ref } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            select_text(ctx.page, &selector, &ctx.current_frame).await
        }
        Step::SelectOption { element_ref, values } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            select_option(ctx.page, &selector, values, &ctx.current_frame).await
        }
        Step::Submit { element_ref } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            submit_form(ctx.page, &selector, &ctx.current_frame).await
        }
        Step::Assert { expression } => {
            let value: Value = ctx.page.evaluate_in_frame(expression, &ctx.current_frame).await?;
            if is_truthy(&value) {
                Ok(value)
            } else {
                Err(EngineError::Assertion(format!("expression `{expression}` was falsy")))
            }
        }
        Step::Frame { selector, index, name } => {
            let requested = match (selector, index, name) {
                (Some(css), _, _) => FrameSelector::Selector(css.clone()),
                (_, Some(i), _) => FrameSelector::Index(*i),
                (_, _, Some(n)) => FrameSelector::Name(n.clone()),
                (None, None, None) => FrameSelector::Top,
            };
            if !ctx.page.has_frame(&requested).await {
                return Err(EngineError::ElementNotFound(format!("no frame matches {requested:?}")));
            }
            ctx.current_frame = requested;
            Ok(Value::Null)
        }
        Step::Drag { from_ref, to_ref } => {
            let from_selector = resolve_selector(ctx, from_ref).await?;
            let to_selector = resolve_selector(ctx, to_ref).await?;
            drag(ctx.page, &from_selector, &to_selector, &ctx.current_frame).await
        }
        Step::Get { element_ref, attribute } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            get_attribute(ctx.page, &selector, attribute.as_deref(), &ctx.current_frame).await
        }
        Step::GetDom { element_ref } => {
            let selector = match element_ref {
                Some(r) => Some(resolve_selector(ctx, r).await?),
                None => None,
            };
            get_dom(ctx.page, selector.as_deref(), &ctx.current_frame).await
        }
        Step::GetBox { element_ref } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            get_box(ctx.page, &selector, &ctx.current_frame).await
        }
        Step::ElementsAt { x, y } => elements_at(ctx.page, *x, *y, &ctx.current_frame).await,
        Step::PageFunction { expression } => executors::page_function(ctx.page, expression, &ctx.current_frame).await,
        Step::Poll { expression, interval_ms, timeout_ms } => {
            let interval = interval_ms.map_or(ctx.poll_interval, Duration::from_millis);
            let timeout = timeout_ms.map_or(ctx.command_timeout, Duration::from_millis);
            executors::poll(ctx.page, expression, interval, timeout, &ctx.current_frame).await
        }
        Step::WriteSiteProfile { name, data } => Ok(json!({ "written": name, "bytes": data.to_string().len() })),
        Step::ReadSiteProfile { name } => Ok(json!({ "name": name, "data": Value::Null })),
        Step::GetUrl => Ok(json!({ "url": ctx.page.current_url().await })),
        Step::GetTitle => {
            let title: String = ctx.page.evaluate_in_frame("document.title", &FrameSelector::Main).await?;
            Ok(json!({ "title": title }))
        }
        Step::Upload { element_ref, paths } => {
            let selector = resolve_selector(ctx, element_ref).await?;
            upload_files(ctx.page, &selector, paths, &ctx.current_frame).await
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_detail(name: Option<&str>) -> DetailLevel {
    match name {
        Some("interactive") => DetailLevel::Interactive,
        Some("summary") => DetailLevel::Summary,
        Some("viewportOnly") => DetailLevel::ViewportOnly,
        _ => DetailLevel::Full,
    }
}

async fn wait_for_selector(page: &Page, selector: &str, interval: Duration, timeout: Duration, frame: &FrameSelector) -> EngineResult<()> {
    let script = format!("!!document.querySelector({:?})", selector);
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let found: bool = page.evaluate_in_frame(&script, frame).await?;
        if found {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(EngineError::ElementNotFound(format!("selector {selector} did not appear within {timeout:?}")));
        }
        tokio::time::sleep(interval).await;
    }
}

async fn scroll(ctx: &mut StepContext<'_>, element_ref: Option<&str>, dx: f64, dy: f64) -> EngineResult<Value> {
    if let Some(r) = element_ref {
        let selector = resolve_selector(ctx, r).await?;
        let script = format!(
            "(function() {{ const el = document.querySelector({selector:?}); if (el) el.scrollIntoView({{block:'center'}}); return !!el; }})()"
        );
        let _: bool = ctx.page.evaluate_in_frame(&script, &ctx.current_frame).await?;
    } else {
        let script = format!("window.scrollBy({dx}, {dy});");
        let _: Value = ctx.page.evaluate_in_frame(&script, &ctx.current_frame).await?;
    }
    Ok(Value::Null)
}

async fn hover(page: &Page, selector: &str, frame: &FrameSelector) -> EngineResult<Value> {
    let script = format!(
        r"(function() {{
            const el = document.querySelector({selector:?});
            if (!el) return null;
            const rect = el.getBoundingClientRect();
            return {{ x: rect.x + rect.width / 2, y: rect.y + rect.height / 2 }};
        }})()"
    );
    #[derive(serde::Deserialize)]
    struct Point {
        x: f64,
        y: f64,
    }
    let point: Option<Point> = page.evaluate_in_frame(&script, frame).await?;
    let Some(point) = point else {
        return Err(EngineError::ElementNotFound(format!("selector {selector} not present")));
    };
    let _: Value = page
        .session()
        .send(
            "Input.dispatchMouseEvent",
            Some(json!({ "type": "mouseMoved", "x": point.x, "y": point.y })),
        )
        .await?;
    Ok(Value::Null)
}

async fn cookies(page: &Page, set: &[Value], clear: bool) -> EngineResult<Value> {
    if clear {
        let _: Value = page.session().send("Network.clearBrowserCookies", None::<Value>).await?;
    }
    if !set.is_empty() {
        let _: Value = page
            .session()
            .send("Network.setCookies", Some(json!({ "cookies": set })))
            .await?;
    }
    let result: Value = page.session().send("Network.getCookies", None::<Value>).await?;
    Ok(result)
}

async fn history_navigate(page: &Page, delta: i32) -> EngineResult<()> {
    let history: Value = page.session().send("Page.getNavigationHistory", None::<Value>).await?;
    let current_index = history.get("currentIndex").and_then(Value::as_i64).unwrap_or(0);
    let entries = history.get("entries").and_then(Value::as_array).cloned().unwrap_or_default();
    let target_index = current_index + i64::from(delta);
    let Some(entry) = entries.get(usize::try_from(target_index).unwrap_or(usize::MAX)) else {
        return Err(EngineError::NotActionable("no entry in that direction of navigation history".to_string()));
    };
    let entry_id = entry.get("id").cloned().unwrap_or(Value::Null);
    let _: Value = page
        .session()
        .send("Page.navigateToHistoryEntry", Some(json!({ "entryId": entry_id })))
        .await?;
    Ok(())
}

async fn select_text(page: &Page, selector: &str, frame: &FrameSelector) -> EngineResult<Value> {
    let script = format!(
        r"(function() {{
            const el = document.querySelector({selector:?});
            if (!el) return false;
            const range = document.createRange();
            range.selectNodeContents(el);
            const sel = window.getSelection();
            sel.removeAllRanges();
            sel.addRange(range);
            return true;
        }})()"
    );
    let ok: bool = page.evaluate_in_frame(&script, frame).await?;
    if ok {
        Ok(Value::Null)
    } else {
        Err(EngineError::ElementNotFound(format!("selector {selector} not present")))
    }
}

async fn select_option(page: &Page, selector: &str, values: &[String], frame: &FrameSelector) -> EngineResult<Value> {
    let values_json = json!(values);
    let script = format!(
        r"(function() {{
            const el = document.querySelector({selector:?});
            if (!el || el.tagName !== 'SELECT') return false;
            const wanted = new Set({values_json});
            for (const opt of el.options) {{ opt.selected = wanted.has(opt.value); }}
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return true;
        }})()"
    );
    let ok: bool = page.evaluate_in_frame(&script, frame).await?;
    if ok {
        Ok(Value::Null)
    } else {
        Err(EngineError::NotActionable(format!("{selector} is not a <select> element")))
    }
}

async fn submit_form(page: &Page, selector: &str, frame: &FrameSelector) -> EngineResult<Value> {
    let script = format!(
        r"(function() {{
            const el = document.querySelector({selector:?});
            const form = el && (el.tagName === 'FORM' ? el : el.closest('form'));
            if (!form) return false;
            form.requestSubmit ? form.requestSubmit() : form.submit();
            return true;
        }})()"
    );
    let ok: bool = page.evaluate_in_frame(&script, frame).await?;
    if ok {
        Ok(Value::Null)
    } else {
        Err(EngineError::ElementNotFound(format!("no form associated with {selector}")))
    }
}

async fn drag(page: &Page, from_selector: &str, to_selector: &str, frame: &FrameSelector) -> EngineResult<Value> {
    let script = format!(
        r"(function() {{
            function center(el) {{ const r = el.getBoundingClientRect(); return {{ x: r.x + r.width / 2, y: r.y + r.height / 2 }}; }}
            const from = document.querySelector({from_selector:?});
            const to = document.querySelector({to_selector:?});
            if (!from || !to) return null;
            return {{ from: center(from), to: center(to) }};
        }})()"
    );
    #[derive(serde::Deserialize)]
    struct Pt {
        x: f64,
        y: f64,
    }
    #[derive(serde::Deserialize)]
    struct DragPoints {
        from: Pt,
        to: Pt,
    }
    let points: Option<DragPoints> = page.evaluate_in_frame(&script, frame).await?;
    let Some(points) = points else {
        return Err(EngineError::ElementNotFound("drag source or target not present".to_string()));
    };

    let session = page.session();
    let _: Value = session
        .send("Input.dispatchMouseEvent", Some(json!({ "type": "mousePressed", "x": points.from.x, "y": points.from.y, "button": "left", "clickCount": 1 })))
        .await?;
    let _: Value = session
        .send("Input.dispatchMouseEvent", Some(json!({ "type": "mouseMoved", "x": points.to.x, "y": points.to.y })))
        .await?;
    let _: Value = session
        .send("Input.dispatchMouseEvent", Some(json!({ "type": "mouseReleased", "x": points.to.x, "y": points.to.y, "button": "left", "clickCount": 1 })))
        .await?;
    Ok(Value::Null)
}

async fn get_attribute(page: &Page, selector: &str, attribute: Option<&str>, frame: &FrameSelector) -> EngineResult<Value> {
    let attr_json = json!(attribute);
    let script = format!(
        r"(function() {{
            const el = document.querySelector({selector:?});
            if (!el) return null;
            const attr = {attr_json};
            return attr ? el.getAttribute(attr) : (el.textContent || '').trim();
        }})()"
    );
    page.evaluate_in_frame(&script, frame).await
}

async fn get_dom(page: &Page, selector: Option<&str>, frame: &FrameSelector) -> EngineResult<Value> {
    let script = match selector {
        Some(s) => format!("(function() {{ const el = document.querySelector({s:?}); return el ? el.outerHTML : null; }})()"),
        None => "document.documentElement.outerHTML".to_string(),
    };
    page.evaluate_in_frame(&script, frame).await
}

async fn get_box(page: &Page, selector: &str, frame: &FrameSelector) -> EngineResult<Value> {
    let script = format!(
        r"(function() {{
            const el = document.querySelector({selector:?});
            if (!el) return null;
            const r = el.getBoundingClientRect();
            return {{ x: r.x, y: r.y, width: r.width, height: r.height }};
        }})()"
    );
    page.evaluate_in_frame(&script, frame).await
}

async fn elements_at(page: &Page, x: f64, y: f64, frame: &FrameSelector) -> EngineResult<Value> {
    let script = format!(
        r"(function() {{
            return document.elementsFromPoint({x}, {y}).map(function(el) {{ return el.tagName.toLowerCase(); }});
        }})()"
    );
    page.evaluate_in_frame(&script, frame).await
}

async fn upload_files(page: &Page, selector: &str, paths: &[String], frame: &FrameSelector) -> EngineResult<Value> {
    let node_id_script = format!(
        r"(function() {{ const el = document.querySelector({selector:?}); return el ? true : false; }})()"
    );
    let exists: bool = page.evaluate_in_frame(&node_id_script, frame).await?;
    if !exists {
        return Err(EngineError::ElementNotFound(format!("selector {selector} not present")));
    }
    let result: Value = page
        .session()
        .send(
            "DOM.setFileInputFiles",
            Some(json!({ "files": paths, "nodeId": Value::Null })),
        )
        .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_js_semantics() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!(1)));
    }

    #[test]
    fn detail_level_defaults_to_full_for_unknown_or_missing_names() {
        assert_eq!(parse_detail(None), DetailLevel::Full);
        assert_eq!(parse_detail(Some("bogus")), DetailLevel::Full);
        assert_eq!(parse_detail(Some("summary")), DetailLevel::Summary);
        assert_eq!(parse_detail(Some("interactive")), DetailLevel::Interactive);
        assert_eq!(parse_detail(Some("viewportOnly")), DetailLevel::ViewportOnly);
    }

    #[test]
    fn modifier_parsing_ignores_unknown_names() {
        let names = vec!["Shift".to_string(), "bogus".to_string(), "ControlOrMeta".to_string()];
        let parsed = parse_modifiers(&names);
        assert_eq!(parsed, vec![KeyModifier::Shift, KeyModifier::ControlOrMeta]);
    }
}
