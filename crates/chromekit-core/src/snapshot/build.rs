//! Turns the raw tree returned by [`super::js::snapshot_walk_script`] into
//! [`SnapshotElement`]s, assigning refs via [`RefAllocator`] (spec.md §4.3).

use std::collections::HashMap;

use serde::Deserialize;

use crate::refs::{ElementIdentity, Ref, RefAllocator};

use super::element::{CheckedState, Rect, SnapshotElement, States};

#[derive(Debug, Deserialize)]
pub struct RawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawStates {
    pub checked: Option<String>,
    pub disabled: bool,
    pub expanded: Option<bool>,
    pub level: Option<u32>,
    pub selected: bool,
    pub pressed: bool,
    pub required: bool,
    pub readonly: bool,
    pub focused: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawIdentity {
    pub selector: String,
    pub role: String,
    #[serde(rename = "normalizedName")]
    pub normalized_name: String,
    #[serde(rename = "shadowHostPath")]
    pub shadow_host_path: Vec<String>,
}

/// Shape of one node as returned by the walk script, before ref assignment.
#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub role: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub visible: bool,
    #[serde(rename = "isFrame")]
    pub is_frame: bool,
    #[serde(rename = "frameUrl")]
    pub frame_url: Option<String>,
    pub rect: RawRect,
    pub states: RawStates,
    #[serde(rename = "valueText")]
    pub value_text: Option<String>,
    pub eligible: bool,
    pub identity: Option<RawIdentity>,
    pub children: Vec<RawNode>,
}

fn parse_checked(raw: Option<&str>) -> Option<CheckedState> {
    match raw {
        Some("true") => Some(CheckedState::True),
        Some("false") => Some(CheckedState::False),
        Some("mixed") => Some(CheckedState::Mixed),
        _ => None,
    }
}

/// Recursively convert a [`RawNode`] tree into a [`SnapshotElement`] tree,
/// assigning refs to eligible nodes via `allocator`.
pub fn build_tree(raw: RawNode, frame_id: &str, allocator: &mut RefAllocator) -> SnapshotElement {
    let mut metadata = HashMap::new();
    build_tree_with_metadata(raw, frame_id, allocator, &mut metadata)
}

/// Same as [`build_tree`], additionally recording each assigned ref's
/// source [`ElementIdentity`] into `metadata`, so the resolver can later
/// recover the selector/role/name/shadow-path behind a ref (spec.md §4.4).
pub fn build_tree_with_metadata(
    raw: RawNode,
    frame_id: &str,
    allocator: &mut RefAllocator,
    metadata: &mut HashMap<Ref, ElementIdentity>,
) -> SnapshotElement {
    let node_ref = raw.identity.as_ref().map(|identity| {
        let key = ElementIdentity {
            selector: identity.selector.clone(),
            role: identity.role.clone(),
            normalized_name: identity.normalized_name.clone(),
            shadow_host_path: identity.shadow_host_path.clone(),
        };
        let assigned = allocator.assign(key.clone());
        metadata.insert(assigned.clone(), key);
        assigned
    });

    let _ = frame_id;
    let mut element = SnapshotElement {
        role: raw.role,
        name: raw.name,
        description: raw.description,
        states: States {
            checked: parse_checked(raw.states.checked.as_deref()),
            disabled: raw.states.disabled,
            expanded: raw.states.expanded,
            level: raw.states.level,
            selected: raw.states.selected,
            pressed: raw.states.pressed,
            required: raw.states.required,
            readonly: raw.states.readonly,
            focused: raw.states.focused,
        },
        value_text: raw.value_text,
        rect: Rect {
            x: raw.rect.x,
            y: raw.rect.y,
            width: raw.rect.width,
            height: raw.rect.height,
        },
        visible: raw.visible,
        is_frame: raw.is_frame,
        frame_url: raw.frame_url,
        node_ref,
        children: Vec::with_capacity(raw.children.len()),
    };

    for child in raw.children {
        element.children.push(build_tree_with_metadata(child, frame_id, allocator, metadata));
    }

    element
}

/// Allocate a fresh, unpreserved ref directly — used only in tests that
/// don't go through the full walk.
#[cfg(test)]
fn direct_ref(frame: &str, generation: u64, element: u64) -> Ref {
    Ref::new(frame, generation, element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(role: &str, eligible: bool) -> RawNode {
        RawNode {
            role: role.to_string(),
            name: Some("Submit".to_string()),
            description: None,
            visible: true,
            is_frame: false,
            frame_url: None,
            rect: RawRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
            states: RawStates {
                checked: None,
                disabled: false,
                expanded: None,
                level: None,
                selected: false,
                pressed: false,
                required: false,
                readonly: false,
                focused: false,
            },
            value_text: None,
            eligible,
            identity: eligible.then(|| RawIdentity {
                selector: "button#submit".to_string(),
                role: role.to_string(),
                normalized_name: "Submit".to_string(),
                shadow_host_path: Vec::new(),
            }),
            children: Vec::new(),
        }
    }

    #[test]
    fn eligible_node_gets_a_ref() {
        let mut allocator = RefAllocator::new("0");
        allocator.begin_explicit_generation();
        let tree = build_tree(leaf("button", true), "0", &mut allocator);
        assert!(tree.has_ref());
    }

    #[test]
    fn ineligible_node_has_no_ref() {
        let mut allocator = RefAllocator::new("0");
        allocator.begin_explicit_generation();
        let tree = build_tree(leaf("generic", false), "0", &mut allocator);
        assert!(!tree.has_ref());
    }

    #[test]
    fn same_identity_preserves_ref_across_generations() {
        let mut allocator = RefAllocator::new("0");
        allocator.begin_explicit_generation();
        let first = build_tree(leaf("button", true), "0", &mut allocator);

        allocator.begin_explicit_generation();
        let second = build_tree(leaf("button", true), "0", &mut allocator);

        assert_eq!(first.node_ref.unwrap().element, second.node_ref.unwrap().element);
        assert_ne!(first.node_ref.unwrap().generation, second.node_ref.unwrap().generation);
    }

    #[test]
    fn direct_ref_helper_constructs_expected_value() {
        let r = direct_ref("0", 1, 2);
        assert_eq!(r.generation, 1);
        assert_eq!(r.element, 2);
    }
}
