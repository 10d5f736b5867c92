//! The ARIA Snapshot & Ref System (spec.md §4.3): captures an accessibility
//! tree from a live page, assigns stable refs to interactive/heading
//! elements, and serializes the result for machine consumers.

mod build;
mod element;
mod format;
mod hash;
mod js;
mod search;

pub use build::{build_tree, build_tree_with_metadata, RawNode};
pub use element::{normalize_whitespace, truncate_name, CheckedState, Rect, SnapshotElement, States};
pub use format::{DetailLevel, SnapshotFormatter};
pub use hash::{compare_since, page_hash, HashComparison};
pub use js::snapshot_walk_script;
pub use search::{search, Arena, SearchHit, SearchQuery, TextMatch};

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::page::{FrameSelector, Page};
use crate::refs::{ElementIdentity, Ref, RefAllocator};

/// How a `snapshot` request should capture and present the tree (spec.md
/// §4.3, §6).
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub detail: DetailLevel,
    pub since: Option<u64>,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

/// A captured accessibility tree together with its page hash, ready to be
/// serialized or diffed against a later snapshot.
#[derive(Debug)]
pub struct AccessibilitySnapshot {
    root: SnapshotElement,
    hash: u64,
    generation: u64,
    ref_metadata: HashMap<Ref, ElementIdentity>,
}

impl AccessibilitySnapshot {
    /// Run the walk script against `page`'s main frame, assign refs via
    /// `allocator`, and compute the page hash.
    ///
    /// `explicit` must be `true` for a user-requested `snapshot` step (bumps
    /// the generation counter) and `false` for the internal auto-snapshots
    /// taken around visual steps (spec.md §4.3, §4.6).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cdp`] if the walk script cannot be evaluated,
    /// including a context-destroyed error if the page navigated mid-walk.
    pub async fn capture(
        page: &Page,
        allocator: &mut RefAllocator,
        explicit: bool,
    ) -> EngineResult<Self> {
        if explicit {
            allocator.begin_explicit_generation();
        } else {
            allocator.reuse_generation();
        }

        let raw: RawNode = page
            .evaluate_in_frame(&snapshot_walk_script(), &FrameSelector::Main)
            .await
            .map_err(|e| match e {
                EngineError::Cdp(cdp) => EngineError::Cdp(cdp),
                other => other,
            })?;

        let frame_id = "0";
        let mut ref_metadata = HashMap::new();
        let root = build_tree_with_metadata(raw, frame_id, allocator, &mut ref_metadata);
        let url = page.current_url().await;
        let (scroll_x, scroll_y) = page.scroll_position().await?;
        let hash = page_hash(&root, &url, scroll_x, scroll_y);

        Ok(Self { root, hash, generation: allocator.generation(), ref_metadata })
    }

    /// The stored identity behind `target`, if it was assigned in this
    /// snapshot (spec.md §4.4 — the Lazy Resolver's input).
    #[must_use]
    pub fn identity_for(&self, target: &Ref) -> Option<&ElementIdentity> {
        self.ref_metadata.get(target)
    }

    #[must_use]
    pub fn root(&self) -> &SnapshotElement {
        &self.root
    }

    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Render this snapshot per `options`, or report that it is unchanged
    /// from `options.since`.
    #[must_use]
    pub fn render(&self, options: &SnapshotOptions) -> HashComparison {
        match compare_since(self.hash, options.since) {
            HashComparison::Unchanged => HashComparison::Unchanged,
            HashComparison::Changed(hash) => HashComparison::Changed(hash),
        }
    }

    /// Format the tree as text per `options.detail`.
    #[must_use]
    pub fn format(&self, options: &SnapshotOptions) -> String {
        SnapshotFormatter::new(options.detail)
            .with_viewport(options.viewport_width, options.viewport_height)
            .format(&self.root)
    }

    /// Run a `snapshotSearch` query against this snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if `query.pattern` is not a valid regex.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, String> {
        let arena = Arena::build(&self.root);
        search(&arena, query)
    }

    /// Locate the ref-bearing node matching `target`, if present, by its
    /// rendered ref string.
    #[must_use]
    pub fn find_ref(&self, target: &Ref) -> bool {
        fn walk(element: &SnapshotElement, target: &str) -> bool {
            if element.node_ref.as_ref().is_some_and(|r| r.to_string() == target) {
                return true;
            }
            element.children.iter().any(|c| walk(c, target))
        }
        walk(&self.root, &target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_ref_locates_nested_node() {
        let mut root = SnapshotElement::new("generic");
        let mut child = SnapshotElement::new("button");
        child.node_ref = Some(Ref::new("0", 1, 1));
        root.children.push(child);

        let snapshot = AccessibilitySnapshot { root, hash: 0, generation: 1, ref_metadata: HashMap::new() };
        assert!(snapshot.find_ref(&Ref::new("0", 1, 1)));
        assert!(!snapshot.find_ref(&Ref::new("0", 1, 2)));
    }
}
