//! The click executor (spec.md §4.5.1).
//!
//! Multi-strategy: find the element's visible center point, try a real CDP
//! pointer event first, fall back to a synthetic JS click for elements CDP
//! can't hit (zero-opacity radios proxied by a visible label, elements
//! covered by another layer), then poll briefly for a same-document SPA
//! navigation the click may have triggered.

use serde::Deserialize;
use serde_json::json;

use crate::error::{EngineError, EngineResult};
use crate::page::{FrameSelector, Page, RESET_SPA_NAV_FLAG_SCRIPT};

use super::keyboard::KeyModifier;

/// Mouse button to dispatch (spec.md §4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl ClickButton {
    const fn as_cdp_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

/// Options for one click step.
#[derive(Debug, Clone, Default)]
pub struct ClickOptions {
    pub button: ClickButton,
    pub double_click: bool,
    pub modifiers: Vec<KeyModifier>,
    pub spa_nav_poll_window: std::time::Duration,
}

#[derive(Debug, Deserialize)]
struct TargetPoint {
    found: bool,
    x: f64,
    y: f64,
    #[serde(rename = "usedLabelProxy")]
    used_label_proxy: bool,
}

fn locate_script(ref_selector: &str) -> String {
    let selector = json!(ref_selector);
    format!(
        r"(function() {{
            const el = document.querySelector({selector});
            if (!el) return {{ found: false, x: 0, y: 0, usedLabelProxy: false }};

            function visibleTarget(node) {{
                const style = getComputedStyle(node);
                const rect = node.getBoundingClientRect();
                const hidden = style.display === 'none' || style.visibility === 'hidden'
                    || parseFloat(style.opacity) === 0 || rect.width === 0 || rect.height === 0;
                if (!hidden) return node;
                if ((node.tagName === 'INPUT') && (node.type === 'radio' || node.type === 'checkbox')) {{
                    const id = node.getAttribute('id');
                    if (id) {{
                        const label = document.querySelector('label[for=' + JSON.stringify(id) + ']');
                        if (label) return label;
                    }}
                    const closest = node.closest('label');
                    if (closest) return closest;
                }}
                return node;
            }}

            const target = visibleTarget(el);
            target.scrollIntoView({{ block: 'center', inline: 'center' }});
            const rect = target.getBoundingClientRect();
            return {{
                found: true,
                x: rect.x + rect.width / 2,
                y: rect.y + rect.height / 2,
                usedLabelProxy: target !== el,
            }};
        }})()"
    )
}

fn js_click_script(ref_selector: &str) -> String {
    let selector = json!(ref_selector);
    format!(
        r"(function() {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.click();
            return true;
        }})()"
    )
}

/// Installs a capture-phase `pointerdown` listener on `selector`'s element
/// that flags whether the element itself (not something stacked above it)
/// received the event, and returns the script to read that flag back
/// (spec.md §4.5.1 steps 4-5).
fn install_pointerdown_verifier_script(ref_selector: &str) -> String {
    let selector = json!(ref_selector);
    format!(
        r"(function() {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.__chromekitPointerdownSeen = false;
            const listener = function() {{ el.__chromekitPointerdownSeen = true; }};
            el.addEventListener('pointerdown', listener, {{ capture: true, once: true }});
            return true;
        }})()"
    )
}

fn read_pointerdown_verified_script(ref_selector: &str) -> String {
    let selector = json!(ref_selector);
    format!(
        r"(function() {{
            const el = document.querySelector({selector});
            return !!(el && el.__chromekitPointerdownSeen);
        }})()"
    )
}

/// Click the element matching `selector` (the CSS selector from the
/// resolved [`crate::refs::ElementIdentity`]; the caller is expected to have
/// already confirmed liveness via [`crate::resolver::resolve`]).
///
/// Returns `true` if a same-document navigation was observed within the
/// poll window (spec.md §4.5.1 step 6).
///
/// # Errors
///
/// Returns [`EngineError::ElementNotFound`] if the element can't be located,
/// or [`EngineError::NotActionable`] if no visible target point exists.
pub async fn click(page: &Page, selector: &str, options: &ClickOptions, frame: &FrameSelector) -> EngineResult<bool> {
    let point: TargetPoint = page.evaluate_in_frame(&locate_script(selector), frame).await?;
    if !point.found {
        return Err(EngineError::ElementNotFound(format!("selector {selector} not present in the DOM")));
    }

    let _: serde_json::Value = page.evaluate_in_frame(RESET_SPA_NAV_FLAG_SCRIPT, frame).await?;

    let _: bool = page.evaluate_in_frame(&install_pointerdown_verifier_script(selector), frame).await?;

    let dispatched = dispatch_cdp_click(page, point.x, point.y, options).await;

    let needs_js_fallback = if dispatched.is_err() {
        true
    } else {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let verified: bool = page.evaluate_in_frame(&read_pointerdown_verified_script(selector), frame).await?;
        !verified
    };

    if needs_js_fallback {
        let clicked: bool = page.evaluate_in_frame(&js_click_script(selector), frame).await?;
        if !clicked {
            return Err(EngineError::NotActionable(format!("could not click {selector}")));
        }
    }

    let navigated = poll_spa_navigation(page, options.spa_nav_poll_window, frame).await?;
    Ok(navigated)
}

async fn dispatch_cdp_click(page: &Page, x: f64, y: f64, options: &ClickOptions) -> EngineResult<()> {
    let session = page.session();
    let modifiers_bitmask: i64 = options.modifiers.iter().map(|m| m.cdp_bitmask()).sum();
    let click_count = i64::from(options.double_click) + 1;

    for event_type in ["mousePressed", "mouseReleased"] {
        let _: serde_json::Value = session
            .send(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": options.button.as_cdp_str(),
                    "clickCount": click_count,
                    "modifiers": modifiers_bitmask,
                })),
            )
            .await?;
    }
    Ok(())
}

async fn poll_spa_navigation(page: &Page, window: std::time::Duration, frame: &FrameSelector) -> EngineResult<bool> {
    #[derive(Debug, Deserialize)]
    struct Flag {
        flag: bool,
    }

    let deadline = tokio::time::Instant::now() + window;
    loop {
        let flag: Flag = page.evaluate_in_frame(super::super::page::READ_SPA_NAV_FLAG_SCRIPT, frame).await?;
        if flag.flag {
            return Ok(true);
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_button_maps_to_cdp_strings() {
        assert_eq!(ClickButton::Left.as_cdp_str(), "left");
        assert_eq!(ClickButton::Right.as_cdp_str(), "right");
        assert_eq!(ClickButton::Middle.as_cdp_str(), "middle");
    }

    #[test]
    fn locate_script_embeds_selector() {
        let script = locate_script("[data-chromekit-ref]");
        assert!(script.contains("usedLabelProxy"));
    }

    #[test]
    fn pointerdown_verifier_installs_a_capture_phase_listener() {
        let script = install_pointerdown_verifier_script("#submit");
        assert!(script.contains("capture: true"));
        assert!(script.contains("pointerdown"));
    }

    #[test]
    fn pointerdown_verified_read_script_embeds_selector() {
        let script = read_pointerdown_verified_script("#submit");
        assert!(script.contains("#submit"));
        assert!(script.contains("__chromekitPointerdownSeen"));
    }
}
