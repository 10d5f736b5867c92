//! The pageFunction/poll executors (spec.md §4.5.5): evaluate untrusted-ish
//! caller-supplied JS and, for `poll`, retry until it returns truthy or a
//! deadline elapses.
//!
//! No sandboxing is attempted (spec.md §1 Non-goals): the caller is treated
//! as a trusted machine consumer, same as the rest of the command surface.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::{EngineError, EngineResult};
use crate::page::{FrameSelector, Page};

/// Evaluate `expression` once in the page and return its JSON-serializable
/// result.
///
/// # Errors
///
/// Returns [`EngineError::Cdp`] on transport/protocol/evaluation failures.
pub async fn page_function(page: &Page, expression: &str, frame: &FrameSelector) -> EngineResult<Value> {
    page.evaluate_in_frame(expression, frame).await
}

/// Evaluate `expression` repeatedly until it returns a truthy value or
/// `timeout` elapses (spec.md §4.5.5, §4.6 `readyWhen`/`settledWhen`).
///
/// # Errors
///
/// Returns [`EngineError::Assertion`] if the deadline elapses without a
/// truthy result, or [`EngineError::Cdp`] on transport/protocol failures.
pub async fn poll(page: &Page, expression: &str, interval: Duration, timeout: Duration, frame: &FrameSelector) -> EngineResult<Value> {
    let deadline = Instant::now() + timeout;
    loop {
        let result = page_function(page, expression, frame).await?;
        if is_truthy(&result) {
            return Ok(result);
        }
        if Instant::now() >= deadline {
            return Err(EngineError::Assertion(format!(
                "poll expression did not become truthy within {timeout:?}"
            )));
        }
        tokio::time::sleep(interval).await;
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_false_and_empty_string_are_falsy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&Value::Bool(false)));
        assert!(!is_truthy(&Value::String(String::new())));
    }

    #[test]
    fn nonempty_values_are_truthy() {
        assert!(is_truthy(&Value::Bool(true)));
        assert!(is_truthy(&Value::String("x".to_string())));
        assert!(is_truthy(&Value::Array(vec![Value::Null])));
    }

    #[test]
    fn zero_is_falsy_nonzero_is_truthy() {
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(is_truthy(&serde_json::json!(1)));
    }
}
