//! The step-type registry (spec.md §4.6): for each step type, whether it
//! is "visual" (needs a before/after snapshot pair for diffing) and which
//! `readyWhen`/`settledWhen` hook keys it accepts.

/// Registry entry for one step type.
#[derive(Debug, Clone, Copy)]
pub struct StepMetadata {
    pub type_name: &'static str,
    /// Visual steps get an automatic before/after snapshot pair around
    /// them so the runner can compute a [`super::Diff`] (spec.md §4.6).
    pub is_visual: bool,
    /// Whether this step type accepts `readyWhen`/`settledWhen` hooks.
    pub supports_hooks: bool,
}

const REGISTRY: &[StepMetadata] = &[
    StepMetadata { type_name: "goto", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "reload", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "wait", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "sleep", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "click", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "fill", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "press", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "query", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "queryAll", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "inspect", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "scroll", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "console", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "pdf", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "snapshot", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "snapshotSearch", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "hover", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "viewport", is_visual: true, supports_hooks: false },
    StepMetadata { type_name: "cookies", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "back", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "forward", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "waitForNavigation", is_visual: false, supports_hooks: true },
    StepMetadata { type_name: "listTabs", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "closeTab", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "newTab", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "selectText", is_visual: true, supports_hooks: false },
    StepMetadata { type_name: "selectOption", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "submit", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "assert", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "frame", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "drag", is_visual: true, supports_hooks: true },
    StepMetadata { type_name: "get", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "getDom", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "getBox", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "elementsAt", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "pageFunction", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "poll", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "writeSiteProfile", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "readSiteProfile", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "switchTab", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "getUrl", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "getTitle", is_visual: false, supports_hooks: false },
    StepMetadata { type_name: "upload", is_visual: true, supports_hooks: true },
];

/// Look up registry metadata for `type_name`.
#[must_use]
pub fn step_metadata(type_name: &str) -> Option<StepMetadata> {
    REGISTRY.iter().find(|entry| entry.type_name == type_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_is_visual_and_supports_hooks() {
        let meta = step_metadata("click").unwrap();
        assert!(meta.is_visual);
        assert!(meta.supports_hooks);
    }

    #[test]
    fn snapshot_is_not_visual() {
        let meta = step_metadata("snapshot").unwrap();
        assert!(!meta.is_visual);
    }

    #[test]
    fn unknown_step_type_returns_none() {
        assert!(step_metadata("not-a-real-step").is_none());
    }

    #[test]
    fn registry_covers_every_step_type() {
        for name in ["goto", "click", "fill", "upload", "getTitle", "poll"] {
            assert!(step_metadata(name).is_some(), "{name} missing from registry");
        }
    }
}
