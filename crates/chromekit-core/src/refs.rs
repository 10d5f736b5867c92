//! The ref textual format and the per-frame generation-counter allocator.
//!
//! A ref is `f{F}s{S}e{E}`: frame identifier, snapshot generation counter,
//! element number. Unlike a content hash, `E` is a monotonically increasing
//! counter allocated by [`RefAllocator`] and reused across snapshot
//! generations for the same element (spec.md §3 Ref invariants, §4.3 ref
//! assignment).

use std::collections::HashMap;
use std::fmt;

/// A parsed `f{F}s{S}e{E}` ref.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ref {
    /// Frame identifier: either a decimal frame index or a bracketed name,
    /// e.g. `0` or `[checkout]`.
    pub frame: String,
    pub generation: u64,
    pub element: u64,
}

impl Ref {
    #[must_use]
    pub fn new(frame: impl Into<String>, generation: u64, element: u64) -> Self {
        Self {
            frame: frame.into(),
            generation,
            element,
        }
    }

    /// Parse the wire format `f{F}s{S}e{E}`. `F` may be `\d+` or `\[name\]`.
    ///
    /// # Errors
    ///
    /// Returns a message describing the malformed part of the string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let rest = s
            .strip_prefix('f')
            .ok_or_else(|| format!("ref '{s}' does not start with 'f'"))?;

        let (frame, rest) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (name, after) = bracketed
                .split_once(']')
                .ok_or_else(|| format!("ref '{s}' has an unterminated frame name"))?;
            (name.to_string(), after)
        } else {
            let split_at = rest
                .find('s')
                .ok_or_else(|| format!("ref '{s}' is missing the 's' generation marker"))?;
            (rest[..split_at].to_string(), &rest[split_at..])
        };

        let rest = rest
            .strip_prefix('s')
            .ok_or_else(|| format!("ref '{s}' is missing the 's' generation marker"))?;
        let (gen_str, rest) = rest
            .split_once('e')
            .ok_or_else(|| format!("ref '{s}' is missing the 'e' element marker"))?;
        let generation: u64 = gen_str
            .parse()
            .map_err(|_| format!("ref '{s}' has a non-numeric generation"))?;
        let element: u64 = rest
            .parse()
            .map_err(|_| format!("ref '{s}' has a non-numeric element number"))?;

        Ok(Self {
            frame,
            generation,
            element,
        })
    }

    /// True if `s` is shaped like a ref (`^f(\d+|\[[^\]]+\])s\d+e\d+$`). Per
    /// spec.md §6, any value matching this pattern in a `click` selector is
    /// automatically treated as a ref rather than a CSS selector.
    #[must_use]
    pub fn looks_like_ref(s: &str) -> bool {
        Self::parse(s).is_ok()
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frame.chars().all(|c| c.is_ascii_digit()) {
            write!(f, "f{}s{}e{}", self.frame, self.generation, self.element)
        } else {
            write!(f, "f[{}]s{}e{}", self.frame, self.generation, self.element)
        }
    }
}

/// Allocates and preserves refs for one frame across snapshot generations.
///
/// Preservation key: the same (selector, role, normalized name, shadow-host
/// path) tuple maps to the same element number, even across many snapshots,
/// as long as the metadata hasn't changed (spec.md §3 Ref invariant (b),
/// §4.3 "Ref assignment").
#[derive(Debug, Default)]
pub struct RefAllocator {
    frame: String,
    generation: u64,
    next_element: u64,
    by_identity: HashMap<ElementIdentity, u64>,
}

/// The identity a ref is preserved against: not the element itself (DOM
/// elements aren't hashable/comparable across snapshots) but the metadata
/// that would be stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementIdentity {
    pub selector: String,
    pub role: String,
    pub normalized_name: String,
    pub shadow_host_path: Vec<String>,
}

impl RefAllocator {
    #[must_use]
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            generation: 1,
            next_element: 1,
            by_identity: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new *explicit* snapshot generation. Per spec.md §4.3, this
    /// increments S so that newly assigned refs in this generation carry the
    /// new S; internal auto-snapshots must call [`RefAllocator::reuse_generation`]
    /// instead.
    pub fn begin_explicit_generation(&mut self) {
        self.generation += 1;
    }

    /// Reuse the current generation for an internal auto-snapshot: ref
    /// allocations in this mode must not bump S (spec.md §4.3).
    pub const fn reuse_generation(&self) {}

    /// Assign (or reuse) a ref for the given element identity.
    ///
    /// Returns the existing ref's element number if this identity has been
    /// seen before, otherwise allocates the next element number. `E` only
    /// increments when a genuinely new element receives a ref (invariant
    /// (c)).
    pub fn assign(&mut self, identity: ElementIdentity) -> Ref {
        let element = if let Some(&existing) = self.by_identity.get(&identity) {
            existing
        } else {
            let element = self.next_element;
            self.next_element += 1;
            self.by_identity.insert(identity, element);
            element
        };
        Ref::new(self.frame.clone(), self.generation, element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_frame() {
        let r = Ref::parse("f0s1e16").unwrap();
        assert_eq!(r.frame, "0");
        assert_eq!(r.generation, 1);
        assert_eq!(r.element, 16);
    }

    #[test]
    fn parses_named_frame() {
        let r = Ref::parse("f[checkout]s2e3").unwrap();
        assert_eq!(r.frame, "checkout");
        assert_eq!(r.generation, 2);
        assert_eq!(r.element, 3);
    }

    #[test]
    fn round_trips_through_display() {
        let r = Ref::new("0", 3, 7);
        assert_eq!(Ref::parse(&r.to_string()).unwrap(), r);

        let named = Ref::new("checkout", 1, 2);
        assert_eq!(Ref::parse(&named.to_string()).unwrap(), named);
    }

    #[test]
    fn rejects_malformed_refs() {
        assert!(Ref::parse("e16").is_err());
        assert!(Ref::parse("f0e16").is_err());
        assert!(Ref::parse("f0s1").is_err());
        assert!(Ref::parse("").is_err());
        assert!(!Ref::looks_like_ref("#submit-button"));
        assert!(Ref::looks_like_ref("f0s1e16"));
    }

    #[test]
    fn preserves_ref_across_generations_for_same_identity() {
        let mut alloc = RefAllocator::new("0");
        let identity = ElementIdentity {
            selector: "#issues-tab".to_string(),
            role: "link".to_string(),
            normalized_name: "issues 835".to_string(),
            shadow_host_path: Vec::new(),
        };

        let first = alloc.assign(identity.clone());
        assert_eq!(first.generation, 1);
        assert_eq!(first.element, 1);

        alloc.begin_explicit_generation();
        let second = alloc.assign(identity);
        assert_eq!(second.generation, 2);
        assert_eq!(second.element, 1, "same identity must reuse element number");
    }

    #[test]
    fn assigns_new_element_numbers_for_new_identities() {
        let mut alloc = RefAllocator::new("0");
        let a = alloc.assign(ElementIdentity {
            selector: "#a".to_string(),
            role: "button".to_string(),
            normalized_name: "a".to_string(),
            shadow_host_path: Vec::new(),
        });
        let b = alloc.assign(ElementIdentity {
            selector: "#b".to_string(),
            role: "button".to_string(),
            normalized_name: "b".to_string(),
            shadow_host_path: Vec::new(),
        });
        assert_eq!(a.element, 1);
        assert_eq!(b.element, 2);
    }
}
