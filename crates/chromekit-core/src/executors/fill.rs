//! The fill executor (spec.md §4.5.2): verifies editability, clears the
//! current value, then types the new text.

use serde::Deserialize;
use serde_json::json;

use crate::error::{EngineError, EngineResult};
use crate::page::{FrameSelector, Page};

use super::keyboard::type_text;

#[derive(Debug, Deserialize)]
struct EditableCheck {
    found: bool,
    editable: bool,
}

fn editable_check_script(selector: &str) -> String {
    let selector = json!(selector);
    format!(
        r"(function() {{
            const el = document.querySelector({selector});
            if (!el) return {{ found: false, editable: false }};
            const tag = el.tagName;
            const editable = (tag === 'INPUT' && !el.disabled && !el.readOnly)
                || (tag === 'TEXTAREA' && !el.disabled && !el.readOnly)
                || el.isContentEditable === true;
            if (editable) el.focus();
            return {{ found: true, editable }};
        }})()"
    )
}

fn select_all_and_delete_script(selector: &str) -> String {
    let selector = json!(selector);
    format!(
        r"(function() {{
            const el = document.querySelector({selector});
            if (!el) return false;
            if (el.isContentEditable) {{
                document.execCommand('selectAll', false, null);
                document.execCommand('delete', false, null);
            }} else {{
                el.select();
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }}
            return true;
        }})()"
    )
}

/// Clear and fill the element matching `selector` with `text` (spec.md
/// §4.5.2).
///
/// # Errors
///
/// Returns [`EngineError::ElementNotFound`] if no element matches, or
/// [`EngineError::NotEditable`] if it can't accept text input.
pub async fn fill(page: &Page, selector: &str, text: &str, frame: &FrameSelector) -> EngineResult<()> {
    let check: EditableCheck = page.evaluate_in_frame(&editable_check_script(selector), frame).await?;

    if !check.found {
        return Err(EngineError::ElementNotFound(format!("selector {selector} not present in the DOM")));
    }
    if !check.editable {
        return Err(EngineError::NotEditable(format!("{selector} is not an editable field")));
    }

    let _: bool = page.evaluate_in_frame(&select_all_and_delete_script(selector), frame).await?;

    type_text(page, text).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editable_check_script_embeds_selector() {
        let script = editable_check_script("#email");
        assert!(script.contains("#email"));
        assert!(script.contains("isContentEditable"));
    }

    #[test]
    fn clear_script_dispatches_input_event() {
        let script = select_all_and_delete_script("#email");
        assert!(script.contains("dispatchEvent"));
    }
}
