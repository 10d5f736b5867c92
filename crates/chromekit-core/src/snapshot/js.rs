//! In-page JavaScript for the ARIA snapshot walk (spec.md §4.3).
//!
//! The script computes everything that needs live DOM access — implicit and
//! explicit roles, accessible names, state bits, visibility, bounding rects,
//! shadow-piercing, and a per-element identity tuple used for ref
//! preservation — and returns a plain JSON tree. Rust-side code
//! ([`super::build`]) turns that tree into [`super::element::SnapshotElement`]
//! values and assigns [`crate::refs::Ref`]s via [`crate::refs::RefAllocator`].
//!
//! Keeping ref *allocation* out of this script is deliberate: the walk must
//! be deterministic and side-effect free so it can run speculatively before
//! an explicit snapshot bumps the generation counter.

/// Returns the walk script. The returned expression evaluates to a JSON
/// value shaped as [`super::build::RawNode`].
#[must_use]
pub fn snapshot_walk_script() -> String {
    r"(function() {
        function normalizeWhitespace(s) {
            return (s || '').replace(/\s+/g, ' ').trim();
        }

        function isVisible(el) {
            if (!el.isConnected) return false;
            const style = getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') return false;
            if (parseFloat(style.opacity) === 0) return false;
            const rect = el.getBoundingClientRect();
            return rect.width > 0 && rect.height > 0;
        }

        const INTERACTIVE_TAGS = new Set(['A', 'BUTTON', 'INPUT', 'SELECT', 'TEXTAREA', 'SUMMARY']);
        const INTERACTIVE_ROLES = new Set([
            'button', 'link', 'checkbox', 'radio', 'textbox', 'combobox', 'listbox',
            'menuitem', 'option', 'switch', 'slider', 'tab', 'searchbox', 'spinbutton',
        ]);
        const HEADING_ROLES = new Set(['heading']);

        function implicitRole(el) {
            const tag = el.tagName;
            switch (tag) {
                case 'A': return el.hasAttribute('href') ? 'link' : 'generic';
                case 'BUTTON': return 'button';
                case 'INPUT': {
                    const type = (el.getAttribute('type') || 'text').toLowerCase();
                    if (type === 'checkbox') return 'checkbox';
                    if (type === 'radio') return 'radio';
                    if (type === 'range') return 'slider';
                    if (type === 'search') return 'searchbox';
                    if (type === 'number') return 'spinbutton';
                    if (type === 'submit' || type === 'button' || type === 'reset') return 'button';
                    return 'textbox';
                }
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
            }
        }

        function roleOf(el) {
            return el.getAttribute('role') || implicitRole(el);
        }

        function headingLevel(el, role) {
            if (role !== 'heading') return null;
            const explicit = el.getAttribute('aria-level');
            if (explicit) return parseInt(explicit, 10);
            const m = /^H([1-6])$/.exec(el.tagName);
            return m ? parseInt(m[1], 10) : null;
        }

        function labelledByText(el) {
            const ids = (el.getAttribute('aria-labelledby') || '').split(/\s+/).filter(Boolean);
            if (ids.length === 0) return null;
            const parts = ids.map((id) => {
                const ref = el.ownerDocument.getElementById(id);
                return ref ? ref.textContent : '';
            });
            const joined = normalizeWhitespace(parts.join(' '));
            return joined || null;
        }

        function accessibleName(el) {
            const labelledBy = labelledByText(el);
            if (labelledBy) return labelledBy;
            const ariaLabel = el.getAttribute('aria-label');
            if (ariaLabel && normalizeWhitespace(ariaLabel)) return normalizeWhitespace(ariaLabel);
            if (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA' || el.tagName === 'SELECT') {
                const id = el.getAttribute('id');
                if (id) {
                    const label = el.ownerDocument.querySelector('label[for=' + JSON.stringify(id) + ']');
                    if (label && normalizeWhitespace(label.textContent)) {
                        return normalizeWhitespace(label.textContent);
                    }
                }
                const closestLabel = el.closest('label');
                if (closestLabel && normalizeWhitespace(closestLabel.textContent)) {
                    return normalizeWhitespace(closestLabel.textContent);
                }
            }
            const title = el.getAttribute('title');
            if (title && normalizeWhitespace(title)) return normalizeWhitespace(title);
            const placeholder = el.getAttribute('placeholder');
            if (placeholder && normalizeWhitespace(placeholder)) return normalizeWhitespace(placeholder);
            const text = normalizeWhitespace(el.textContent);
            if (text) return text;
            if ('value' in el && el.value) return normalizeWhitespace(String(el.value));
            return null;
        }

        function cssPath(el, root) {
            const parts = [];
            let node = el;
            while (node && node !== root && node.nodeType === 1) {
                let selector = node.tagName.toLowerCase();
                if (node.id) {
                    selector += '#' + CSS.escape(node.id);
                    parts.unshift(selector);
                    break;
                }
                const parent = node.parentElement;
                if (parent) {
                    const siblings = Array.from(parent.children).filter((c) => c.tagName === node.tagName);
                    if (siblings.length > 1) {
                        selector += ':nth-of-type(' + (siblings.indexOf(node) + 1) + ')';
                    }
                }
                parts.unshift(selector);
                node = node.parentElement;
            }
            return parts.join(' > ');
        }

        function walk(root, shadowPath, out) {
            const el = root;
            const role = roleOf(el);
            const visible = isVisible(el);
            const interactive = INTERACTIVE_TAGS.has(el.tagName) || INTERACTIVE_ROLES.has(role)
                || el.hasAttribute('tabindex') || el.hasAttribute('onclick');
            const isHeading = HEADING_ROLES.has(role);
            const eligible = visible && (interactive || isHeading);

            const rect = el.getBoundingClientRect();
            const node = {
                role,
                name: accessibleName(el),
                description: normalizeWhitespace(el.getAttribute('aria-description') || '') || null,
                visible,
                isFrame: el.tagName === 'IFRAME',
                frameUrl: el.tagName === 'IFRAME' ? (el.src || null) : null,
                rect: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
                states: {
                    checked: el.hasAttribute('aria-checked')
                        ? el.getAttribute('aria-checked')
                        : ('checked' in el ? (el.indeterminate ? 'mixed' : (el.checked ? 'true' : 'false')) : null),
                    disabled: el.disabled === true || el.getAttribute('aria-disabled') === 'true',
                    expanded: el.hasAttribute('aria-expanded') ? el.getAttribute('aria-expanded') === 'true' : null,
                    level: headingLevel(el, role),
                    selected: el.getAttribute('aria-selected') === 'true' || el.selected === true,
                    pressed: el.getAttribute('aria-pressed') === 'true',
                    required: el.required === true || el.getAttribute('aria-required') === 'true',
                    readonly: el.readOnly === true || el.getAttribute('aria-readonly') === 'true',
                    focused: el.ownerDocument.activeElement === el,
                },
                valueText: 'value' in el ? String(el.value) : null,
                eligible,
                identity: eligible ? {
                    selector: cssPath(el, el.getRootNode() === document ? document.body : el.getRootNode().host || el),
                    role,
                    normalizedName: normalizeWhitespace(accessibleName(el) || ''),
                    shadowHostPath: shadowPath,
                } : null,
                children: [],
            };

            const childNodes = el.shadowRoot
                ? Array.from(el.shadowRoot.children)
                : Array.from(el.children);
            const nextShadowPath = el.shadowRoot
                ? shadowPath.concat([cssPath(el, document.body)])
                : shadowPath;

            for (const child of childNodes) {
                node.children.push(walk(child, nextShadowPath, out));
            }
            return node;
        }

        return walk(document.body, [], []);
    })()".to_string()
}

#[cfg(test)]
mod tests {
    use super::snapshot_walk_script;

    #[test]
    fn script_references_required_state_bits() {
        let script = snapshot_walk_script();
        assert!(script.contains("required"));
        assert!(script.contains("readonly"));
        assert!(script.contains("focused"));
    }

    #[test]
    fn script_computes_identity_for_eligibility() {
        let script = snapshot_walk_script();
        assert!(script.contains("shadowHostPath"));
        assert!(script.contains("normalizedName"));
    }
}
