//! Result normalizer: raw adapter payloads to typed response shapes.
//!
//! MCP agents answer with a list of content parts whose text holds the JSON
//! payload; A2A agents answer with the payload itself. Either way the
//! completed payload is parsed into the operation's response type here, and
//! a payload that does not fit becomes a [`TaskResult::Failed`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::result::{Completed, Failed, TaskResult};

/// Parse a completed raw result into `T`. Other states pass through.
pub fn normalize<T: DeserializeOwned>(raw: TaskResult<Value>) -> TaskResult<T> {
    let completed = match raw.retype::<T>() {
        Ok(passthrough) => return passthrough,
        Err(completed) => completed,
    };
    let Completed {
        data,
        success,
        message,
        metadata,
        debug_info,
    } = completed;

    match parse_payload::<T>(data) {
        Ok((typed, resolved)) => TaskResult::Completed(Completed {
            data: typed,
            success: success && !has_errors(&resolved),
            message,
            metadata,
            debug_info,
        }),
        Err(error) => {
            tracing::warn!(error = %error, "Response did not match the expected shape");
            TaskResult::Failed(Failed {
                error: format!("Failed to parse response: {error}"),
                debug_info,
            })
        }
    }
}

/// Whether a payload reports logical errors.
pub(crate) fn has_errors(data: &Value) -> bool {
    data.get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty())
}

/// Parse `data` into `T`, returning the JSON it was parsed from.
fn parse_payload<T: DeserializeOwned>(data: Value) -> Result<(T, Value), String> {
    match data {
        Value::Array(parts) => parse_content_parts(parts),
        Value::String(text) => {
            let value: Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
            let typed = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
            Ok((typed, value))
        }
        other => {
            let typed = serde_json::from_value(other.clone()).map_err(|e| e.to_string())?;
            Ok((typed, other))
        }
    }
}

/// Find the first content part whose JSON fits `T`. Falls back to the whole
/// array, for response shapes that are themselves lists.
fn parse_content_parts<T: DeserializeOwned>(parts: Vec<Value>) -> Result<(T, Value), String> {
    let mut first_error: Option<String> = None;
    for part in &parts {
        let Some(candidate) = part_payload(part) else {
            continue;
        };
        match serde_json::from_value::<T>(candidate.clone()) {
            Ok(typed) => return Ok((typed, candidate)),
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    let whole = Value::Array(parts);
    match serde_json::from_value::<T>(whole.clone()) {
        Ok(typed) => Ok((typed, whole)),
        Err(e) => Err(first_error.unwrap_or_else(|| {
            if whole.as_array().is_some_and(Vec::is_empty) {
                "response has no content".into()
            } else {
                e.to_string()
            }
        })),
    }
}

/// The JSON carried by one content part, if any.
fn part_payload(part: &Value) -> Option<Value> {
    let text = match part.get("type").and_then(Value::as_str) {
        Some("text") => part.get("text").and_then(Value::as_str),
        Some("resource") => part
            .get("resource")
            .and_then(|r| r.get("text"))
            .and_then(Value::as_str),
        // A bare JSON object in the list.
        None if part.is_object() => return Some(part.clone()),
        _ => None,
    }?;
    serde_json::from_str(text).ok()
}
