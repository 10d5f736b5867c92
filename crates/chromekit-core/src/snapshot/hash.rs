//! The page hash and `since` unchanged-detection protocol (spec.md §3 Page
//! Hash, §4.3, §8).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::element::SnapshotElement;

/// A cheap structural fingerprint of a snapshot, used so a caller can pass
/// a previous `since` hash and get back `unchanged: true` instead of a full
/// re-serialization (spec.md §3, §4.3: "checksum of URL, scroll position,
/// DOM-size proxy, count of interactive elements, and an XOR-fold of state
/// bits").
///
/// Deliberately not cryptographic: collisions only cost an unnecessary
/// re-render, never a correctness issue, since the hash is always paired
/// with an explicit snapshot generation.
#[must_use]
pub fn page_hash(root: &SnapshotElement, url: &str, scroll_x: f64, scroll_y: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    (scroll_x as i64).hash(&mut hasher);
    (scroll_y as i64).hash(&mut hasher);
    root.count_elements().hash(&mut hasher);
    root.count_refs().hash(&mut hasher);
    hash_node(root, &mut hasher);
    hasher.finish()
}

fn hash_node(element: &SnapshotElement, hasher: &mut DefaultHasher) {
    element.role.hash(hasher);
    element.name.hash(hasher);
    element.value_text.hash(hasher);
    element.visible.hash(hasher);
    element.states.checked.hash(hasher);
    element.states.disabled.hash(hasher);
    element.states.expanded.hash(hasher);
    element.states.selected.hash(hasher);
    element.states.pressed.hash(hasher);
    (element.rect.x as i64).hash(hasher);
    (element.rect.y as i64).hash(hasher);
    (element.rect.width as i64).hash(hasher);
    (element.rect.height as i64).hash(hasher);
    for child in &element.children {
        hash_node(child, hasher);
    }
}

/// Result of comparing a freshly computed hash against a caller-supplied
/// `since` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashComparison {
    Unchanged,
    Changed(u64),
}

/// Compare `current` against an optional `since` hash from the caller.
#[must_use]
pub fn compare_since(current: u64, since: Option<u64>) -> HashComparison {
    match since {
        Some(previous) if previous == current => HashComparison::Unchanged,
        _ => HashComparison::Changed(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::element::CheckedState;

    #[test]
    fn identical_trees_hash_identically() {
        let a = SnapshotElement::new("button");
        let b = SnapshotElement::new("button");
        assert_eq!(page_hash(&a, "https://example.com", 0.0, 0.0), page_hash(&b, "https://example.com", 0.0, 0.0));
    }

    #[test]
    fn differing_name_changes_the_hash() {
        let mut a = SnapshotElement::new("button");
        a.name = Some("Submit".to_string());
        let mut b = SnapshotElement::new("button");
        b.name = Some("Cancel".to_string());
        assert_ne!(page_hash(&a, "https://example.com", 0.0, 0.0), page_hash(&b, "https://example.com", 0.0, 0.0));
    }

    #[test]
    fn toggling_checked_state_changes_the_hash() {
        let mut a = SnapshotElement::new("checkbox");
        a.states.checked = Some(CheckedState::False);
        let mut b = SnapshotElement::new("checkbox");
        b.states.checked = Some(CheckedState::True);
        assert_ne!(page_hash(&a, "https://example.com", 0.0, 0.0), page_hash(&b, "https://example.com", 0.0, 0.0));
    }

    #[test]
    fn differing_value_text_changes_the_hash() {
        let mut a = SnapshotElement::new("textbox");
        a.value_text = Some("foo".to_string());
        let mut b = SnapshotElement::new("textbox");
        b.value_text = Some("bar".to_string());
        assert_ne!(page_hash(&a, "https://example.com", 0.0, 0.0), page_hash(&b, "https://example.com", 0.0, 0.0));
    }

    #[test]
    fn differing_url_changes_the_hash() {
        let tree = SnapshotElement::new("button");
        assert_ne!(
            page_hash(&tree, "https://example.com/a", 0.0, 0.0),
            page_hash(&tree, "https://example.com/b", 0.0, 0.0)
        );
    }

    #[test]
    fn differing_scroll_position_changes_the_hash() {
        let tree = SnapshotElement::new("button");
        assert_ne!(
            page_hash(&tree, "https://example.com", 0.0, 0.0),
            page_hash(&tree, "https://example.com", 0.0, 400.0)
        );
    }

    #[test]
    fn matching_since_reports_unchanged() {
        let tree = SnapshotElement::new("button");
        let hash = page_hash(&tree, "https://example.com", 0.0, 0.0);
        assert_eq!(compare_since(hash, Some(hash)), HashComparison::Unchanged);
    }

    #[test]
    fn mismatched_since_reports_changed_with_new_hash() {
        let tree = SnapshotElement::new("button");
        let hash = page_hash(&tree, "https://example.com", 0.0, 0.0);
        assert_eq!(compare_since(hash, Some(hash.wrapping_add(1))), HashComparison::Changed(hash));
    }

    #[test]
    fn missing_since_always_reports_changed() {
        let tree = SnapshotElement::new("button");
        let hash = page_hash(&tree, "https://example.com", 0.0, 0.0);
        assert_eq!(compare_since(hash, None), HashComparison::Changed(hash));
    }
}
