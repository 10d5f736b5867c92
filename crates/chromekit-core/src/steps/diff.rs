//! Before/after snapshot diffing for visual steps (spec.md §3 Diff, §4.6).

use serde::Serialize;

use crate::snapshot::{CheckedState, SnapshotElement};

const DEFAULT_MAX_ITEMS: usize = 50;

/// One line item in a [`Diff`]'s `added`/`removed` buckets.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiffEntry {
    pub role: String,
    pub name: Option<String>,
    pub ref_string: Option<String>,
}

/// One per-ref state transition in a [`Diff`]'s `changed` bucket (spec.md
/// §3 Diff: "field, from, to").
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StateTransition {
    pub role: String,
    pub name: Option<String>,
    pub ref_string: Option<String>,
    pub field: String,
    pub from: String,
    pub to: String,
}

/// What changed between a before/after snapshot pair around a visual step
/// (spec.md §3 Diff).
#[derive(Debug, Clone, Serialize, Default)]
pub struct Diff {
    pub added: Vec<DiffEntry>,
    pub removed: Vec<DiffEntry>,
    pub changed: Vec<StateTransition>,
    /// Set when any of `added`/`removed`/`changed` was truncated to
    /// `max_items` (spec.md §6 "no silent caps").
    pub truncated: bool,
}

/// The subset of a node's state tracked for `changed` detection, kept
/// alongside its [`DiffEntry`] identity but never serialized itself.
#[derive(Debug, Clone, PartialEq)]
struct StateFingerprint {
    checked: Option<CheckedState>,
    disabled: bool,
    expanded: Option<bool>,
    selected: bool,
    pressed: bool,
    value_text: Option<String>,
}

impl StateFingerprint {
    fn of(element: &SnapshotElement) -> Self {
        Self {
            checked: element.states.checked,
            disabled: element.states.disabled,
            expanded: element.states.expanded,
            selected: element.states.selected,
            pressed: element.states.pressed,
            value_text: element.value_text.clone(),
        }
    }

    /// Field-by-field transitions from `self` to `other`, as `(field, from, to)`.
    fn transitions_to(&self, other: &Self) -> Vec<(&'static str, String, String)> {
        let mut out = Vec::new();
        if self.checked != other.checked {
            out.push(("checked", format_checked(self.checked), format_checked(other.checked)));
        }
        if self.disabled != other.disabled {
            out.push(("disabled", self.disabled.to_string(), other.disabled.to_string()));
        }
        if self.expanded != other.expanded {
            out.push(("expanded", format_opt_bool(self.expanded), format_opt_bool(other.expanded)));
        }
        if self.selected != other.selected {
            out.push(("selected", self.selected.to_string(), other.selected.to_string()));
        }
        if self.pressed != other.pressed {
            out.push(("pressed", self.pressed.to_string(), other.pressed.to_string()));
        }
        if self.value_text != other.value_text {
            out.push(("value", format_opt_string(&self.value_text), format_opt_string(&other.value_text)));
        }
        out
    }
}

fn format_checked(state: Option<CheckedState>) -> String {
    match state {
        Some(CheckedState::True) => "true".to_string(),
        Some(CheckedState::False) => "false".to_string(),
        Some(CheckedState::Mixed) => "mixed".to_string(),
        None => "none".to_string(),
    }
}

fn format_opt_bool(value: Option<bool>) -> String {
    value.map_or_else(|| "none".to_string(), |b| b.to_string())
}

fn format_opt_string(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn flatten(element: &SnapshotElement, out: &mut Vec<(DiffEntry, StateFingerprint)>) {
    if element.has_ref() || element.role == "heading" {
        out.push((
            DiffEntry {
                role: element.role.clone(),
                name: element.name.clone(),
                ref_string: element.node_ref.as_ref().map(ToString::to_string),
            },
            StateFingerprint::of(element),
        ));
    }
    for child in &element.children {
        flatten(child, out);
    }
}

fn identity_key(entry: &DiffEntry) -> (String, Option<String>) {
    (entry.role.clone(), entry.name.clone())
}

/// Diff `before` against `after`, matching entries by (role, name) since
/// refs may have been reassigned between generations.
#[must_use]
pub fn diff_snapshots(before: &SnapshotElement, after: &SnapshotElement) -> Diff {
    diff_snapshots_limited(before, after, DEFAULT_MAX_ITEMS)
}

/// Same as [`diff_snapshots`] but with an explicit per-bucket item cap.
#[must_use]
pub fn diff_snapshots_limited(before: &SnapshotElement, after: &SnapshotElement, max_items: usize) -> Diff {
    let mut before_entries = Vec::new();
    let mut after_entries = Vec::new();
    flatten(before, &mut before_entries);
    flatten(after, &mut after_entries);

    let before_by_key: std::collections::HashMap<(String, Option<String>), (DiffEntry, StateFingerprint)> =
        before_entries.iter().cloned().map(|(entry, state)| (identity_key(&entry), (entry, state))).collect();
    let after_by_key: std::collections::HashMap<(String, Option<String>), (DiffEntry, StateFingerprint)> =
        after_entries.iter().cloned().map(|(entry, state)| (identity_key(&entry), (entry, state))).collect();

    let mut added: Vec<_> = after_entries
        .iter()
        .filter(|(entry, _)| !before_by_key.contains_key(&identity_key(entry)))
        .map(|(entry, _)| entry.clone())
        .collect();
    let mut removed: Vec<_> = before_entries
        .iter()
        .filter(|(entry, _)| !after_by_key.contains_key(&identity_key(entry)))
        .map(|(entry, _)| entry.clone())
        .collect();

    let mut changed = Vec::new();
    for (key, (after_entry, after_state)) in &after_by_key {
        if let Some((_, before_state)) = before_by_key.get(key) {
            for (field, from, to) in before_state.transitions_to(after_state) {
                changed.push(StateTransition {
                    role: after_entry.role.clone(),
                    name: after_entry.name.clone(),
                    ref_string: after_entry.ref_string.clone(),
                    field: field.to_string(),
                    from,
                    to,
                });
            }
        }
    }

    let mut truncated = false;
    for len in [added.len(), removed.len(), changed.len()] {
        if len > max_items {
            truncated = true;
        }
    }
    added.truncate(max_items);
    removed.truncate(max_items);
    changed.truncate(max_items);

    Diff { added, removed, changed, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::Ref;

    fn tree_with(names: &[&str]) -> SnapshotElement {
        let mut root = SnapshotElement::new("generic");
        for (i, name) in names.iter().enumerate() {
            let mut el = SnapshotElement::new("button");
            el.name = Some((*name).to_string());
            el.node_ref = Some(Ref::new("0", 1, i as u64 + 1));
            root.children.push(el);
        }
        root
    }

    #[test]
    fn no_change_yields_empty_diff() {
        let before = tree_with(&["Submit"]);
        let after = tree_with(&["Submit"]);
        let diff = diff_snapshots(&before, &after);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn new_element_is_added() {
        let before = tree_with(&["Submit"]);
        let after = tree_with(&["Submit", "Cancel"]);
        let diff = diff_snapshots(&before, &after);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name.as_deref(), Some("Cancel"));
    }

    #[test]
    fn removed_element_is_removed() {
        let before = tree_with(&["Submit", "Cancel"]);
        let after = tree_with(&["Submit"]);
        let diff = diff_snapshots(&before, &after);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].name.as_deref(), Some("Cancel"));
    }

    #[test]
    fn checked_toggle_is_reported_as_a_changed_entry() {
        let mut before = SnapshotElement::new("generic");
        let mut checkbox = SnapshotElement::new("checkbox");
        checkbox.name = Some("Accept terms".to_string());
        checkbox.node_ref = Some(Ref::new("0", 1, 1));
        checkbox.states.checked = Some(CheckedState::False);
        before.children.push(checkbox);

        let mut after = SnapshotElement::new("generic");
        let mut checkbox = SnapshotElement::new("checkbox");
        checkbox.name = Some("Accept terms".to_string());
        checkbox.node_ref = Some(Ref::new("0", 1, 1));
        checkbox.states.checked = Some(CheckedState::True);
        after.children.push(checkbox);

        let diff = diff_snapshots(&before, &after);
        assert_eq!(diff.changed.len(), 1);
        let transition = &diff.changed[0];
        assert_eq!(transition.field, "checked");
        assert_eq!(transition.from, "false");
        assert_eq!(transition.to, "true");
        assert_eq!(transition.name.as_deref(), Some("Accept terms"));
    }

    #[test]
    fn unrelated_elements_produce_no_changed_entries() {
        let before = tree_with(&["Submit"]);
        let after = tree_with(&["Submit"]);
        let diff = diff_snapshots(&before, &after);
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn oversized_diff_is_truncated_and_flagged() {
        let names: Vec<String> = (0..60).map(|i| format!("item-{i}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let before = tree_with(&[]);
        let after = tree_with(&name_refs);
        let diff = diff_snapshots(&before, &after);
        assert!(diff.truncated);
        assert_eq!(diff.added.len(), DEFAULT_MAX_ITEMS);
    }
}
