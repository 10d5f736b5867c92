//! Text serialization of an accessibility tree (spec.md §4.3 "Detail modes").

use std::fmt::Write;

use super::element::{truncate_name, CheckedState, SnapshotElement};

const DEFAULT_NAME_TRUNCATION: usize = 150;
const INDENT: &str = "  ";

/// How much of the tree a `snapshot` request surfaces (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    #[default]
    Full,
    Interactive,
    Summary,
    ViewportOnly,
}

/// Serializes a [`SnapshotElement`] tree into the indented text format.
#[derive(Debug, Clone)]
pub struct SnapshotFormatter {
    pub detail: DetailLevel,
    pub name_truncation: usize,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for SnapshotFormatter {
    fn default() -> Self {
        Self {
            detail: DetailLevel::Full,
            name_truncation: DEFAULT_NAME_TRUNCATION,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl SnapshotFormatter {
    #[must_use]
    pub fn new(detail: DetailLevel) -> Self {
        Self { detail, ..Self::default() }
    }

    #[must_use]
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Render `root` per this formatter's detail mode.
    #[must_use]
    pub fn format(&self, root: &SnapshotElement) -> String {
        let mut output = String::new();
        if self.detail == DetailLevel::Summary {
            self.format_summary(&mut output, root);
        } else {
            self.format_node(&mut output, root, 0);
        }
        output
    }

    fn should_emit(&self, element: &SnapshotElement) -> bool {
        match self.detail {
            DetailLevel::Full | DetailLevel::Summary => true,
            DetailLevel::Interactive => element.has_ref() || element.is_frame,
            DetailLevel::ViewportOnly => {
                element.rect.intersects_viewport(self.viewport_width, self.viewport_height)
            }
        }
    }

    fn format_node(&self, output: &mut String, element: &SnapshotElement, depth: usize) {
        if self.should_emit(element) {
            let indent = INDENT.repeat(depth);
            output.push_str(&indent);
            output.push_str("- ");
            output.push_str(&element.role);

            if let Some(name) = &element.name {
                let truncated = truncate_name(name, self.name_truncation);
                let _ = write!(output, " \"{truncated}\"");
            }

            if element.is_frame {
                output.push_str(" [frame-boundary]");
            }

            Self::format_states(output, element);

            if let Some(node_ref) = &element.node_ref {
                let _ = write!(output, " [ref={node_ref}]");
            }

            output.push('\n');
        }

        let next_depth = if self.should_emit(element) { depth + 1 } else { depth };
        for child in &element.children {
            self.format_node(output, child, next_depth);
        }
    }

    fn format_summary(&self, output: &mut String, root: &SnapshotElement) {
        let refs = root.count_refs();
        let total = root.count_elements();
        let _ = writeln!(output, "{total} elements, {refs} with refs");
        Self::collect_headings(output, root);
    }

    fn collect_headings(output: &mut String, element: &SnapshotElement) {
        if element.role == "heading" {
            let name = element.name.as_deref().unwrap_or("");
            let level = element.states.level.unwrap_or(1);
            let _ = writeln!(output, "{}h{level}: {name}", INDENT.repeat(0));
        }
        for child in &element.children {
            Self::collect_headings(output, child);
        }
    }

    fn format_states(output: &mut String, element: &SnapshotElement) {
        let states = &element.states;
        if states.disabled {
            output.push_str(" (disabled)");
        }
        if let Some(expanded) = states.expanded {
            output.push_str(if expanded { " (expanded)" } else { " (collapsed)" });
        }
        if states.selected {
            output.push_str(" (selected)");
        }
        if let Some(checked) = &states.checked {
            output.push_str(match checked {
                CheckedState::True => " (checked)",
                CheckedState::False => " (unchecked)",
                CheckedState::Mixed => " (mixed)",
            });
        }
        if states.pressed {
            output.push_str(" (pressed)");
        }
        if states.required {
            output.push_str(" (required)");
        }
        if states.readonly {
            output.push_str(" (readonly)");
        }
        if states.focused {
            output.push_str(" (focused)");
        }
        if let Some(level) = states.level {
            let _ = write!(output, " (level {level})");
        }
        if let Some(value) = &element.value_text {
            if !value.is_empty() {
                let _ = write!(output, " (value: {value})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::Ref;

    fn button(name: &str, with_ref: bool) -> SnapshotElement {
        let mut el = SnapshotElement::new("button");
        el.name = Some(name.to_string());
        if with_ref {
            el.node_ref = Some(Ref::new("0", 1, 1));
        }
        el
    }

    #[test]
    fn full_mode_emits_every_node() {
        let mut root = SnapshotElement::new("generic");
        root.children.push(button("Submit", true));
        let rendered = SnapshotFormatter::new(DetailLevel::Full).format(&root);
        assert!(rendered.contains("generic"));
        assert!(rendered.contains("Submit"));
        assert!(rendered.contains("[ref=f0s1e1]"));
    }

    #[test]
    fn interactive_mode_skips_non_ref_non_frame_nodes() {
        let mut root = SnapshotElement::new("generic");
        root.children.push(button("Decoration", false));
        let rendered = SnapshotFormatter::new(DetailLevel::Interactive).format(&root);
        assert!(!rendered.contains("generic"));
        assert!(!rendered.contains("Decoration"));
    }

    #[test]
    fn viewport_only_mode_filters_offscreen_nodes() {
        let mut root = SnapshotElement::new("generic");
        root.rect = crate::snapshot::element::Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let mut offscreen = button("Off", true);
        offscreen.rect = crate::snapshot::element::Rect { x: 5000.0, y: 5000.0, width: 10.0, height: 10.0 };
        root.children.push(offscreen);
        let rendered = SnapshotFormatter::new(DetailLevel::ViewportOnly)
            .with_viewport(800.0, 600.0)
            .format(&root);
        assert!(rendered.contains("generic"));
        assert!(!rendered.contains("Off"));
    }

    #[test]
    fn summary_mode_counts_elements_and_headings() {
        let mut root = SnapshotElement::new("generic");
        let mut heading = SnapshotElement::new("heading");
        heading.name = Some("Title".to_string());
        heading.states.level = Some(2);
        root.children.push(heading);
        let rendered = SnapshotFormatter::new(DetailLevel::Summary).format(&root);
        assert!(rendered.contains("2 elements"));
        assert!(rendered.contains("h2: Title"));
    }
}
