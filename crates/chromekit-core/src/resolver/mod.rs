//! The Lazy Element Resolver (spec.md §4.4): re-finds the live DOM element
//! behind a ref at the moment a step needs it, rather than holding a
//! long-lived handle that would go stale across re-renders.
//!
//! Critical contract: the metadata stored at snapshot time (selector, role,
//! normalized name, shadow-host path) must be compared using the exact same
//! whitespace normalization used when it was captured
//! ([`crate::snapshot::normalize_whitespace`]), or verification would
//! spuriously fail for names that differ only in collapsed whitespace.

use serde::Deserialize;
use serde_json::json;

use crate::error::{EngineError, EngineResult};
use crate::page::{FrameSelector, Page};
use crate::refs::ElementIdentity;

/// Outcome of resolving a ref against the live DOM.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveOutcome {
    pub found: bool,
    pub strategy: Option<String>,
    #[serde(rename = "roleMatch")]
    pub role_match: bool,
}

/// Resolve `identity` against the live page and report how it was found.
///
/// Resolution order (spec.md §4.4):
/// 1. direct selector lookup, verified by connected + role + normalized
///    substring-name match;
/// 2. a role+name scan of the whole document if the selector is stale;
/// 3. a recursive shadow-root scan, following `identity.shadow_host_path`.
///
/// # Errors
///
/// Returns [`EngineError::ElementNotFound`] if none of the strategies locate
/// a matching element, or [`EngineError::Cdp`] for transport/protocol
/// failures.
pub async fn resolve(page: &Page, identity: &ElementIdentity) -> EngineResult<()> {
    let script = resolve_script(identity);
    let outcome: ResolveOutcome = page.evaluate_in_frame(&script, &FrameSelector::Main).await?;

    if !outcome.found {
        return Err(EngineError::ElementNotFound(format!(
            "no element matches selector {:?} role {:?} name {:?}",
            identity.selector, identity.role, identity.normalized_name
        )));
    }
    if !outcome.role_match {
        return Err(EngineError::ElementNotFound(format!(
            "element at {:?} no longer has role {:?}",
            identity.selector, identity.role
        )));
    }
    Ok(())
}

/// Builds a JS expression evaluating to [`ResolveOutcome`] for `identity`.
fn resolve_script(identity: &ElementIdentity) -> String {
    let selector = json!(identity.selector);
    let role = json!(identity.role);
    let normalized_name = json!(identity.normalized_name);
    let shadow_path = json!(identity.shadow_host_path);

    format!(
        r"(function() {{
            function normalize(s) {{ return (s || '').replace(/\s+/g, ' ').trim(); }}

            function implicitRole(el) {{
                const tag = el.tagName;
                switch (tag) {{
                    case 'A': return el.hasAttribute('href') ? 'link' : 'generic';
                    case 'BUTTON': return 'button';
                    case 'INPUT': {{
                        const type = (el.getAttribute('type') || 'text').toLowerCase();
                        if (type === 'checkbox') return 'checkbox';
                        if (type === 'radio') return 'radio';
                        if (type === 'range') return 'slider';
                        if (type === 'search') return 'searchbox';
                        if (type === 'number') return 'spinbutton';
                        if (type === 'submit' || type === 'button' || type === 'reset') return 'button';
                        return 'textbox';
                    }}
                    case 'SELECT': return 'combobox';
                    case 'TEXTAREA': return 'textbox';
                    case 'SUMMARY': return 'button';
                    case 'H1': case 'H2': case 'H3': case 'H4': case 'H5': case 'H6': return 'heading';
                    case 'NAV': return 'navigation';
                    case 'MAIN': return 'main';
                    case 'HEADER': return 'banner';
                    case 'FOOTER': return 'contentinfo';
                    case 'UL': case 'OL': return 'list';
                    case 'LI': return 'listitem';
                    case 'IMG': return el.getAttribute('alt') === '' ? 'presentation' : 'img';
                    case 'FORM': return 'form';
                    case 'TABLE': return 'table';
                    default: return 'generic';
                }}
            }}

            function roleOf(el) {{
                return el.getAttribute('role') || implicitRole(el);
            }}

            function nameOf(el) {{
                return normalize(el.getAttribute('aria-label') || el.textContent || '');
            }}

            function matches(el, role, name) {{
                if (!el || !el.isConnected) return false;
                const elRole = roleOf(el);
                const roleOk = elRole === role;
                const elName = nameOf(el).toLowerCase();
                const nameOk = name === '' || elName.includes(name.toLowerCase());
                return {{ roleOk, nameOk }};
            }}

            function directLookup(root) {{
                try {{ return root.querySelector({selector}); }} catch (e) {{ return null; }}
            }}

            function scanForRoleName(root, role, name) {{
                const all = root.querySelectorAll('*');
                for (const el of all) {{
                    const check = matches(el, role, name);
                    if (check.roleOk && check.nameOk && el.isConnected) return el;
                }}
                return null;
            }}

            function resolveShadowRoot(path) {{
                let root = document;
                for (const hostSelector of path) {{
                    const host = root.querySelector(hostSelector);
                    if (!host || !host.shadowRoot) return null;
                    root = host.shadowRoot;
                }}
                return root;
            }}

            const role = {role};
            const name = {normalized_name};
            const shadowPath = {shadow_path};

            let root = document;
            if (shadowPath.length > 0) {{
                const resolved = resolveShadowRoot(shadowPath);
                if (resolved) root = resolved;
            }}

            let el = directLookup(root);
            let strategy = 'selector';

            if (!el || !el.isConnected) {{
                el = scanForRoleName(root, role, name);
                strategy = 'role-name-scan';
            }}

            if (!el && shadowPath.length === 0) {{
                const shadowHosts = document.querySelectorAll('*');
                for (const host of shadowHosts) {{
                    if (host.shadowRoot) {{
                        const found = scanForRoleName(host.shadowRoot, role, name);
                        if (found) {{ el = found; strategy = 'shadow-scan'; break; }}
                    }}
                }}
            }}

            if (!el) {{
                return {{ found: false, strategy: null, roleMatch: false }};
            }}

            const check = matches(el, role, name);
            return {{ found: true, strategy, roleMatch: check.roleOk }};
        }})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_script_embeds_identity_fields() {
        let identity = ElementIdentity {
            selector: "button#submit".to_string(),
            role: "button".to_string(),
            normalized_name: "Submit order".to_string(),
            shadow_host_path: vec!["my-app".to_string()],
        };
        let script = resolve_script(&identity);
        assert!(script.contains("button#submit"));
        assert!(script.contains("Submit order"));
        assert!(script.contains("my-app"));
    }

    #[test]
    fn resolve_script_handles_empty_shadow_path() {
        let identity = ElementIdentity {
            selector: "#a".to_string(),
            role: "button".to_string(),
            normalized_name: String::new(),
            shadow_host_path: Vec::new(),
        };
        let script = resolve_script(&identity);
        assert!(script.contains("shadowPath"));
    }

    #[test]
    fn resolve_script_computes_implicit_roles_and_requires_strict_role_match() {
        let identity = ElementIdentity {
            selector: "button#submit".to_string(),
            role: "button".to_string(),
            normalized_name: String::new(),
            shadow_host_path: Vec::new(),
        };
        let script = resolve_script(&identity);
        assert!(script.contains("function implicitRole(el)"));
        assert!(script.contains("el.getAttribute('role') || implicitRole(el)"));
        assert!(script.contains("const roleOk = elRole === role;"));
    }
}
