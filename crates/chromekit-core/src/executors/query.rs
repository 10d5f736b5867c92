//! The query/queryAll executors (spec.md §4.5.4): CSS or role-based lookups
//! that don't require a ref, for steps that just want to read text or
//! attributes from the page.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::EngineResult;
use crate::page::{FrameSelector, Page};

/// One matched element's reported facts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryMatch {
    pub text: String,
    pub tag: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

fn query_script(selector: &str, all: bool) -> String {
    let selector = json!(selector);
    let collector = if all {
        "Array.from(document.querySelectorAll(sel))"
    } else {
        "(function() { const el = document.querySelector(sel); return el ? [el] : []; })()"
    };
    format!(
        r"(function() {{
            const sel = {selector};
            const elements = {collector};
            return elements.map(function(el) {{
                const attributes = {{}};
                for (const attr of el.attributes) {{ attributes[attr.name] = attr.value; }}
                return {{ text: (el.textContent || '').trim(), tag: el.tagName.toLowerCase(), attributes }};
            }});
        }})()"
    )
}

/// Return the first element matching `selector`, if any.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Cdp`] on transport/protocol
/// failures.
pub async fn query(page: &Page, selector: &str, frame: &FrameSelector) -> EngineResult<Option<QueryMatch>> {
    let matches: Vec<QueryMatch> = page.evaluate_in_frame(&query_script(selector, false), frame).await?;
    Ok(matches.into_iter().next())
}

/// Return every element matching `selector`.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Cdp`] on transport/protocol
/// failures.
pub async fn query_all(page: &Page, selector: &str, frame: &FrameSelector) -> EngineResult<Vec<QueryMatch>> {
    page.evaluate_in_frame(&query_script(selector, true), frame).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_query_script_returns_at_most_one() {
        let script = query_script("#app", false);
        assert!(script.contains("querySelector(sel)"));
        assert!(!script.contains("querySelectorAll"));
    }

    #[test]
    fn query_all_script_uses_query_selector_all() {
        let script = query_script(".item", true);
        assert!(script.contains("querySelectorAll(sel)"));
    }
}
