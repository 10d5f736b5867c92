//! The closed set of step types accepted by a single-shot invocation
//! (spec.md §6 "Step shapes"), the registry describing each one, and the
//! runner that drives the around-step diffing protocol (spec.md §4.6).

mod diff;
mod registry;
mod runner;

pub use diff::{diff_snapshots, Diff, DiffEntry, StateTransition};
pub use registry::{step_metadata, StepMetadata};
pub use runner::{run_step, StepContext, StepOutcome};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::page::WaitUntil;

/// One of the 40 step types a command document may contain (spec.md §6).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    Goto { url: String, #[serde(default)] wait_until: WaitUntil },
    Reload { #[serde(default)] wait_until: WaitUntil },
    Wait { #[serde(default)] selector: Option<String>, #[serde(default)] timeout_ms: Option<u64> },
    Sleep { ms: u64 },
    Click { #[serde(rename = "ref")] element_ref: String, #[serde(default)] button: Option<String>, #[serde(default)] double_click: bool, #[serde(default)] modifiers: Vec<String> },
    Fill { #[serde(rename = "ref")] element_ref: String, text: String },
    Press { key: String, #[serde(default)] modifiers: Vec<String> },
    Query { selector: String },
    QueryAll { selector: String },
    Inspect { #[serde(rename = "ref")] element_ref: String },
    Scroll { #[serde(rename = "ref")] element_ref: Option<String>, #[serde(default)] dx: f64, #[serde(default)] dy: f64 },
    Console { #[serde(default)] clear: bool },
    Pdf { #[serde(default)] path: Option<String> },
    Snapshot { #[serde(default)] detail: Option<String>, #[serde(default)] since: Option<u64> },
    SnapshotSearch { text: Option<String>, pattern: Option<String>, role: Option<String>, near: Option<String>, #[serde(default)] exact: bool, #[serde(default)] limit: usize, #[serde(default)] context: usize },
    Hover { #[serde(rename = "ref")] element_ref: String },
    Viewport { width: u32, height: u32 },
    Cookies { #[serde(default)] set: Vec<Value>, #[serde(default)] clear: bool },
    Back,
    Forward,
    WaitForNavigation { #[serde(default)] timeout_ms: Option<u64> },
    ListTabs,
    CloseTab { #[serde(default)] tab: Option<String> },
    NewTab { #[serde(default)] url: Option<String> },
    SelectText { #[serde(rename = "ref")] element_ref: String },
    SelectOption { #[serde(rename = "ref")] element_ref: String, values: Vec<String> },
    Submit { #[serde(rename = "ref")] element_ref: String },
    Assert { expression: String },
    Frame { selector: Option<String>, index: Option<usize>, name: Option<String> },
    Drag { from_ref: String, to_ref: String },
    Get { #[serde(rename = "ref")] element_ref: String, #[serde(default)] attribute: Option<String> },
    GetDom { #[serde(rename = "ref")] element_ref: Option<String> },
    GetBox { #[serde(rename = "ref")] element_ref: String },
    ElementsAt { x: f64, y: f64 },
    PageFunction { expression: String },
    Poll { expression: String, #[serde(default)] interval_ms: Option<u64>, #[serde(default)] timeout_ms: Option<u64> },
    WriteSiteProfile { name: String, data: Value },
    ReadSiteProfile { name: String },
    SwitchTab { tab: String },
    GetUrl,
    GetTitle,
    Upload { #[serde(rename = "ref")] element_ref: String, paths: Vec<String> },
}

impl Step {
    /// The step type name as it appears on the wire (spec.md §6), used for
    /// registry lookups and diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Goto { .. } => "goto",
            Self::Reload { .. } => "reload",
            Self::Wait { .. } => "wait",
            Self::Sleep { .. } => "sleep",
            Self::Click { .. } => "click",
            Self::Fill { .. } => "fill",
            Self::Press { .. } => "press",
            Self::Query { .. } => "query",
            Self::QueryAll { .. } => "queryAll",
            Self::Inspect { .. } => "inspect",
            Self::Scroll { .. } => "scroll",
            Self::Console { .. } => "console",
            Self::Pdf { .. } => "pdf",
            Self::Snapshot { .. } => "snapshot",
            Self::SnapshotSearch { .. } => "snapshotSearch",
            Self::Hover { .. } => "hover",
            Self::Viewport { .. } => "viewport",
            Self::Cookies { .. } => "cookies",
            Self::Back => "back",
            Self::Forward => "forward",
            Self::WaitForNavigation { .. } => "waitForNavigation",
            Self::ListTabs => "listTabs",
            Self::CloseTab { .. } => "closeTab",
            Self::NewTab { .. } => "newTab",
            Self::SelectText { .. } => "selectText",
            Self::SelectOption { .. } => "selectOption",
            Self::Submit { .. } => "submit",
            Self::Assert { .. } => "assert",
            Self::Frame { .. } => "frame",
            Self::Drag { .. } => "drag",
            Self::Get { .. } => "get",
            Self::GetDom { .. } => "getDom",
            Self::GetBox { .. } => "getBox",
            Self::ElementsAt { .. } => "elementsAt",
            Self::PageFunction { .. } => "pageFunction",
            Self::Poll { .. } => "poll",
            Self::WriteSiteProfile { .. } => "writeSiteProfile",
            Self::ReadSiteProfile { .. } => "readSiteProfile",
            Self::SwitchTab { .. } => "switchTab",
            Self::GetUrl => "getUrl",
            Self::GetTitle => "getTitle",
            Self::Upload { .. } => "upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_click_step() {
        let json = serde_json::json!({ "type": "click", "ref": "f0s1e1" });
        let step: Step = serde_json::from_value(json).unwrap();
        assert_eq!(step.type_name(), "click");
    }

    #[test]
    fn deserializes_goto_with_default_wait_until() {
        let json = serde_json::json!({ "type": "goto", "url": "https://example.com" });
        let step: Step = serde_json::from_value(json).unwrap();
        match step {
            Step::Goto { url, wait_until } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(wait_until, WaitUntil::Load);
            }
            _ => panic!("expected Goto"),
        }
    }

    #[test]
    fn every_step_type_has_a_distinct_name() {
        let names = [
            "goto", "reload", "wait", "sleep", "click", "fill", "press", "query", "queryAll",
            "inspect", "scroll", "console", "pdf", "snapshot", "snapshotSearch", "hover",
            "viewport", "cookies", "back", "forward", "waitForNavigation", "listTabs",
            "closeTab", "newTab", "selectText", "selectOption", "submit", "assert", "frame",
            "drag", "get", "getDom", "getBox", "elementsAt", "pageFunction", "poll",
            "writeSiteProfile", "readSiteProfile", "switchTab", "getUrl", "getTitle", "upload",
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
