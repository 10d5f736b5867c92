//! The in-memory accessibility tree node (spec.md §3 Snapshot, §4.3).

use serde::Serialize;

use crate::refs::Ref;

/// `aria-checked`/native-checkbox tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckedState {
    True,
    False,
    Mixed,
}

/// The state bits reported in brackets on a serialized line (spec.md §4.3).
#[derive(Debug, Clone, Default)]
pub struct States {
    pub checked: Option<CheckedState>,
    pub disabled: bool,
    pub expanded: Option<bool>,
    pub level: Option<u32>,
    pub selected: bool,
    pub pressed: bool,
    pub required: bool,
    pub readonly: bool,
    pub focused: bool,
}

/// A node's viewport-relative bounding rect, used for viewport filtering and
/// the `near` snapshotSearch predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn intersects_viewport(&self, viewport_width: f64, viewport_height: f64) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x < viewport_width
            && self.y < viewport_height
            && self.x + self.width > 0.0
            && self.y + self.height > 0.0
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One node of the accessibility tree.
#[derive(Debug, Clone)]
pub struct SnapshotElement {
    pub role: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub states: States,
    pub value_text: Option<String>,
    pub rect: Rect,
    pub visible: bool,
    pub is_frame: bool,
    pub frame_url: Option<String>,
    pub node_ref: Option<Ref>,
    pub children: Vec<Self>,
}

impl SnapshotElement {
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: None,
            description: None,
            states: States::default(),
            value_text: None,
            rect: Rect::default(),
            visible: true,
            is_frame: false,
            frame_url: None,
            node_ref: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_ref(&self) -> bool {
        self.node_ref.is_some()
    }

    /// Count of ref-bearing nodes in this subtree (inclusive).
    #[must_use]
    pub fn count_refs(&self) -> usize {
        usize::from(self.has_ref()) + self.children.iter().map(Self::count_refs).sum::<usize>()
    }

    /// Count of all nodes in this subtree (inclusive).
    #[must_use]
    pub fn count_elements(&self) -> usize {
        1 + self.children.iter().map(Self::count_elements).sum::<usize>()
    }

    /// Count of nodes whose bounding rect intersects the viewport.
    #[must_use]
    pub fn count_in_viewport(&self, viewport_width: f64, viewport_height: f64) -> usize {
        usize::from(self.rect.intersects_viewport(viewport_width, viewport_height))
            + self
                .children
                .iter()
                .map(|c| c.count_in_viewport(viewport_width, viewport_height))
                .sum::<usize>()
    }
}

/// Collapse whitespace to single spaces and trim, matching the
/// accessible-name computation rule (spec.md §4.3) so that store-time and
/// resolver verify-time normalization never diverge (spec.md §4.4 "Critical
/// contract").
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a name to `max_len` characters, appending an ellipsis when
/// truncated (spec.md §4.3, default 150).
#[must_use]
pub fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len || max_len < 4 {
        return name.to_string();
    }
    let truncated: String = name.chars().take(max_len - 3).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_newlines_and_tabs_to_single_spaces() {
        assert_eq!(normalize_whitespace("Issues\n   835"), "Issues 835");
        assert_eq!(normalize_whitespace("  a\tb  c "), "a b c");
    }

    #[test]
    fn truncates_over_length_names_with_ellipsis() {
        let long = "x".repeat(200);
        let truncated = truncate_name(&long, 150);
        assert_eq!(truncated.chars().count(), 150);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn leaves_short_names_untouched() {
        assert_eq!(truncate_name("Issues 835", 150), "Issues 835");
    }

    #[test]
    fn rect_intersects_viewport_rejects_zero_size() {
        let rect = Rect { x: 10.0, y: 10.0, width: 0.0, height: 0.0 };
        assert!(!rect.intersects_viewport(800.0, 600.0));
    }

    #[test]
    fn count_refs_is_recursive() {
        let mut root = SnapshotElement::new("group");
        let mut child = SnapshotElement::new("button");
        child.node_ref = Some(Ref::new("0", 1, 1));
        root.children.push(child);
        assert_eq!(root.count_refs(), 1);
        assert_eq!(root.count_elements(), 2);
    }
}
