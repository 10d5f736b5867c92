//! `snapshotSearch` matching (spec.md §4.5.4, §9 "arena of nodes").
//!
//! Search needs parent pointers for the `near` predicate and for building a
//! node's ancestor context. An owned `children: Vec<Self>` tree can't hold a
//! back-pointer without a reference cycle, so the tree is flattened into an
//! arena (`Vec<Node>` indexed by position, `parent: Option<usize>`) once per
//! search rather than threaded through the primary [`super::element::SnapshotElement`]
//! representation.

use regex::Regex;

use super::element::SnapshotElement;

/// One flattened node in the search arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<usize>,
    pub depth: usize,
    pub role: String,
    pub name: Option<String>,
    pub rect: (f64, f64, f64, f64),
    pub ref_string: Option<String>,
}

/// A flattened, parent-indexed view of a snapshot tree, built once per
/// search so `near` and ancestor-context queries don't need to walk the
/// owned tree repeatedly.
#[derive(Debug, Default)]
pub struct Arena {
    pub nodes: Vec<Node>,
}

impl Arena {
    #[must_use]
    pub fn build(root: &SnapshotElement) -> Self {
        let mut arena = Self::default();
        arena.push(root, None, 0);
        arena
    }

    fn push(&mut self, element: &SnapshotElement, parent: Option<usize>, depth: usize) {
        let index = self.nodes.len();
        self.nodes.push(Node {
            parent,
            depth,
            role: element.role.clone(),
            name: element.name.clone(),
            rect: (element.rect.x, element.rect.y, element.rect.width, element.rect.height),
            ref_string: element.node_ref.as_ref().map(ToString::to_string),
        });
        for child in &element.children {
            self.push(child, Some(index), depth + 1);
        }
    }

    /// Ancestor chain of `index`, nearest first.
    #[must_use]
    pub fn ancestors(&self, index: usize) -> Vec<&Node> {
        let mut chain = Vec::new();
        let mut current = self.nodes[index].parent;
        while let Some(i) = current {
            chain.push(&self.nodes[i]);
            current = self.nodes[i].parent;
        }
        chain
    }
}

/// How a query's `text` should be matched against a node's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMatch {
    #[default]
    Substring,
    Exact,
}

/// A `snapshotSearch` query (spec.md §4.5.4).
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub text_match: TextMatch,
    pub pattern: Option<String>,
    pub role: Option<String>,
    pub near: Option<String>,
    pub context: usize,
    pub limit: usize,
}

/// One hit, with surrounding ancestor context (spec.md §4.5.4 `context`).
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub index: usize,
    pub role: String,
    pub name: Option<String>,
    pub ref_string: Option<String>,
    pub ancestor_roles: Vec<String>,
}

fn euclidean_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn center(rect: (f64, f64, f64, f64)) -> (f64, f64) {
    (rect.0 + rect.2 / 2.0, rect.1 + rect.3 / 2.0)
}

/// Run `query` against `arena`, returning matches ordered by document
/// position and truncated to `query.limit` (0 meaning unlimited).
///
/// # Errors
///
/// Returns an error if `query.pattern` is not a valid regex.
pub fn search(arena: &Arena, query: &SearchQuery) -> Result<Vec<SearchHit>, String> {
    let pattern = query
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| format!("invalid pattern: {e}"))?;

    let near_anchor = query
        .near
        .as_ref()
        .and_then(|near_ref| arena.nodes.iter().find(|n| n.ref_string.as_deref() == Some(near_ref)))
        .map(|n| center(n.rect));

    let mut hits = Vec::new();
    for (index, node) in arena.nodes.iter().enumerate() {
        if let Some(role) = &query.role {
            if &node.role != role {
                continue;
            }
        }

        if let Some(text) = &query.text {
            let name = node.name.as_deref().unwrap_or("");
            let matched = match query.text_match {
                TextMatch::Exact => name.eq_ignore_ascii_case(text),
                TextMatch::Substring => name.to_lowercase().contains(&text.to_lowercase()),
            };
            if !matched {
                continue;
            }
        }

        if let Some(re) = &pattern {
            if !node.name.as_deref().is_some_and(|name| re.is_match(name)) {
                continue;
            }
        }

        if let Some(anchor) = near_anchor {
            let distance = euclidean_distance(anchor, center(node.rect));
            const NEAR_RADIUS_PX: f64 = 200.0;
            if distance > NEAR_RADIUS_PX {
                continue;
            }
        }

        let ancestor_roles = arena
            .ancestors(index)
            .into_iter()
            .take(query.context)
            .map(|n| n.role.clone())
            .collect();

        hits.push(SearchHit {
            index,
            role: node.role.clone(),
            name: node.name.clone(),
            ref_string: node.ref_string.clone(),
            ancestor_roles,
        });

        if query.limit > 0 && hits.len() >= query.limit {
            break;
        }
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::Ref;

    fn sample_tree() -> SnapshotElement {
        let mut root = SnapshotElement::new("generic");
        let mut group = SnapshotElement::new("group");
        let mut submit = SnapshotElement::new("button");
        submit.name = Some("Submit order".to_string());
        submit.node_ref = Some(Ref::new("0", 1, 1));
        submit.rect.x = 100.0;
        submit.rect.y = 100.0;
        submit.rect.width = 20.0;
        submit.rect.height = 20.0;

        let mut cancel = SnapshotElement::new("button");
        cancel.name = Some("Cancel".to_string());
        cancel.node_ref = Some(Ref::new("0", 1, 2));
        cancel.rect.x = 900.0;
        cancel.rect.y = 900.0;
        cancel.rect.width = 20.0;
        cancel.rect.height = 20.0;

        group.children.push(submit);
        group.children.push(cancel);
        root.children.push(group);
        root
    }

    #[test]
    fn text_match_is_case_insensitive_substring_by_default() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery { text: Some("submit".to_string()), ..Default::default() };
        let hits = search(&arena, &query).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_deref(), Some("Submit order"));
    }

    #[test]
    fn exact_text_match_rejects_partial_names() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery {
            text: Some("submit".to_string()),
            text_match: TextMatch::Exact,
            ..Default::default()
        };
        assert!(search(&arena, &query).unwrap().is_empty());
    }

    #[test]
    fn role_filter_narrows_results() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery { role: Some("button".to_string()), ..Default::default() };
        assert_eq!(search(&arena, &query).unwrap().len(), 2);
    }

    #[test]
    fn near_filter_excludes_distant_nodes() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery { near: Some("f0s1e1".to_string()), ..Default::default() };
        let hits = search(&arena, &query).unwrap();
        assert!(hits.iter().any(|h| h.ref_string.as_deref() == Some("f0s1e1")));
        assert!(!hits.iter().any(|h| h.ref_string.as_deref() == Some("f0s1e2")));
    }

    #[test]
    fn context_collects_ancestor_roles() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery { role: Some("button".to_string()), context: 2, ..Default::default() };
        let hits = search(&arena, &query).unwrap();
        assert!(hits[0].ancestor_roles.contains(&"group".to_string()));
    }

    #[test]
    fn limit_truncates_results() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery { role: Some("button".to_string()), limit: 1, ..Default::default() };
        assert_eq!(search(&arena, &query).unwrap().len(), 1);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let arena = Arena::build(&sample_tree());
        let query = SearchQuery { pattern: Some("(".to_string()), ..Default::default() };
        assert!(search(&arena, &query).is_err());
    }
}
