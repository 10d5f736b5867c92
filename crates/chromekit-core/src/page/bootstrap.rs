//! The at-document-start initialization script (spec.md §4.2).
//!
//! Installed via `Page.addScriptToEvaluateOnNewDocument` so it runs before
//! any page script on every new document, including same-document SPA
//! re-renders that don't create a new document (those keep the existing
//! globals, which is the point: refs must survive client-side re-renders).
//!
//! Responsibilities:
//! - allocate `__ariaRefs`, `__ariaRefMeta`, `__ariaRefCounter`,
//!   `__ariaSnapshotId` if not already present;
//! - assign this frame a stable identifier;
//! - patch `history.pushState`/`replaceState` and install a `popstate`
//!   listener so the SPA-navigation detector in the click executor
//!   (spec.md §4.5.1 step 6) has a flag and URL to poll.

/// Returns the bootstrap script source. `frame_id` is substituted verbatim;
/// callers must ensure it is a JS string/number literal, not raw input.
#[must_use]
pub fn bootstrap_script(frame_id_literal: &str) -> String {
    format!(
        r"(function() {{
            if (!window.__ariaRefs) {{
                window.__ariaRefs = Object.create(null);
                window.__ariaRefMeta = Object.create(null);
                window.__ariaRefCounter = 0;
                window.__ariaSnapshotId = 1;
            }}
            window.__ariaFrameId = {frame_id_literal};

            if (!window.__spaNavPatched) {{
                window.__spaNavPatched = true;
                window.__spaNavFlag = false;
                window.__spaNavUrl = location.href;

                const origPushState = history.pushState.bind(history);
                const origReplaceState = history.replaceState.bind(history);

                history.pushState = function(...args) {{
                    const result = origPushState(...args);
                    window.__spaNavFlag = true;
                    window.__spaNavUrl = location.href;
                    return result;
                }};
                history.replaceState = function(...args) {{
                    const result = origReplaceState(...args);
                    window.__spaNavFlag = true;
                    window.__spaNavUrl = location.href;
                    return result;
                }};
                window.addEventListener('popstate', function() {{
                    window.__spaNavFlag = true;
                    window.__spaNavUrl = location.href;
                }});
            }}
        }})()"
    )
}

/// Reset the SPA-navigation flag before dispatching a click, so the
/// post-click poll (spec.md §4.5.1 step 6) observes only this action's
/// navigation, not a stale flag from an earlier step.
pub const RESET_SPA_NAV_FLAG_SCRIPT: &str = "window.__spaNavFlag = false;";

/// Poll expression evaluated by the click executor: `{flag, url}`.
pub const READ_SPA_NAV_FLAG_SCRIPT: &str =
    "({ flag: !!window.__spaNavFlag, url: window.__spaNavUrl || location.href })";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_script_embeds_frame_id_literal() {
        let script = bootstrap_script("0");
        assert!(script.contains("window.__ariaFrameId = 0;"));
        assert!(script.contains("__ariaRefCounter"));
        assert!(script.contains("pushState"));
    }
}
