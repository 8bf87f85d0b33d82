//! TaskResult — the uniform outcome of every AdCP operation.
//!
//! A result is in exactly one of four states. The state and its payload are
//! one enum variant, so a status that disagrees with the populated fields
//! cannot be constructed. On the wire the result is a flat object with a
//! `status` discriminant and one of `data`, `submitted`, `needs_input` or
//! `error`; deserialization rejects objects where the two disagree.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Task execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Submitted,
    NeedsInput,
    Failed,
    /// Reported by webhook deliveries for in-flight tasks. Never the status
    /// of a [`TaskResult`].
    Working,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Submitted => "submitted",
            TaskStatus::NeedsInput => "needs_input",
            TaskStatus::Failed => "failed",
            TaskStatus::Working => "working",
        };
        f.write_str(s)
    }
}

/// Request/response capture attached to results when `AgentConfig::debug`
/// is set. Credentials in `request.headers` are redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub request: Value,
    pub response: Value,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completed<T> {
    pub data: T,
    /// Logical success. False when the payload carries an `errors` array.
    pub success: bool,
    pub message: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub debug_info: Option<DebugInfo>,
}

/// Accepted by the agent; the result arrives out of band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submitted {
    pub webhook_url: Option<String>,
    pub operation_id: Option<String>,
    /// Task id assigned by the agent, when it reports one.
    pub task_id: Option<String>,
    pub partial_data: Option<Value>,
    pub message: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub debug_info: Option<DebugInfo>,
}

/// The agent wants clarification before it proceeds.
#[derive(Debug, Clone, PartialEq)]
pub struct NeedsInput {
    pub message: String,
    pub field: Option<String>,
    pub debug_info: Option<DebugInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failed {
    pub error: String,
    pub debug_info: Option<DebugInfo>,
}

/// Outcome of one AdCP operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult<T> {
    Completed(Completed<T>),
    Submitted(Submitted),
    NeedsInput(NeedsInput),
    Failed(Failed),
}

impl<T> TaskResult<T> {
    /// A successful completion carrying `data`.
    pub fn completed(data: T) -> Self {
        TaskResult::Completed(Completed {
            data,
            success: true,
            message: None,
            metadata: None,
            debug_info: None,
        })
    }

    pub fn failed(error: impl Into<String>) -> Self {
        TaskResult::Failed(Failed {
            error: error.into(),
            debug_info: None,
        })
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            TaskResult::Completed(_) => TaskStatus::Completed,
            TaskResult::Submitted(_) => TaskStatus::Submitted,
            TaskResult::NeedsInput(_) => TaskStatus::NeedsInput,
            TaskResult::Failed(_) => TaskStatus::Failed,
        }
    }

    /// True only for a completion without logical errors.
    pub fn success(&self) -> bool {
        matches!(self, TaskResult::Completed(c) if c.success)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskResult::Completed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            TaskResult::Completed(c) => Some(&c.data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            TaskResult::Completed(c) => Some(c.data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskResult::Failed(f) => Some(&f.error),
            _ => None,
        }
    }

    /// Human-readable message from whichever state carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            TaskResult::Completed(c) => c.message.as_deref(),
            TaskResult::Submitted(s) => s.message.as_deref(),
            TaskResult::NeedsInput(n) => Some(&n.message),
            TaskResult::Failed(f) => Some(&f.error),
        }
    }

    pub fn debug_info(&self) -> Option<&DebugInfo> {
        match self {
            TaskResult::Completed(c) => c.debug_info.as_ref(),
            TaskResult::Submitted(s) => s.debug_info.as_ref(),
            TaskResult::NeedsInput(n) => n.debug_info.as_ref(),
            TaskResult::Failed(f) => f.debug_info.as_ref(),
        }
    }

    pub fn set_debug_info(&mut self, info: Option<DebugInfo>) {
        match self {
            TaskResult::Completed(c) => c.debug_info = info,
            TaskResult::Submitted(s) => s.debug_info = info,
            TaskResult::NeedsInput(n) => n.debug_info = info,
            TaskResult::Failed(f) => f.debug_info = info,
        }
    }

    /// Transform the completed payload, keeping every other state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TaskResult<U> {
        match self {
            TaskResult::Completed(c) => TaskResult::Completed(Completed {
                data: f(c.data),
                success: c.success,
                message: c.message,
                metadata: c.metadata,
                debug_info: c.debug_info,
            }),
            TaskResult::Submitted(s) => TaskResult::Submitted(s),
            TaskResult::NeedsInput(n) => TaskResult::NeedsInput(n),
            TaskResult::Failed(f) => TaskResult::Failed(f),
        }
    }

    /// Re-type a non-completed result. A completion becomes `Err(self)`.
    pub fn retype<U>(self) -> Result<TaskResult<U>, Completed<T>> {
        match self {
            TaskResult::Completed(c) => Err(c),
            TaskResult::Submitted(s) => Ok(TaskResult::Submitted(s)),
            TaskResult::NeedsInput(n) => Ok(TaskResult::NeedsInput(n)),
            TaskResult::Failed(f) => Ok(TaskResult::Failed(f)),
        }
    }
}

// ── Wire representation ──────────────────────────────────────

#[derive(Serialize)]
struct SubmittedRef<'a> {
    webhook_url: &'a Option<String>,
    operation_id: &'a Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: &'a Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_data: &'a Option<Value>,
}

#[derive(Serialize)]
struct NeedsInputRef<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: &'a Option<String>,
}

#[derive(Serialize)]
struct ResultRef<'a, T> {
    status: TaskStatus,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted: Option<SubmittedRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    needs_input: Option<NeedsInputRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<&'a DebugInfo>,
}

impl<T: Serialize> Serialize for TaskResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut repr = ResultRef {
            status: self.status(),
            success: self.success(),
            data: None,
            message: None,
            metadata: None,
            submitted: None,
            needs_input: None,
            error: None,
            debug_info: self.debug_info(),
        };
        match self {
            TaskResult::Completed(c) => {
                repr.data = Some(&c.data);
                repr.message = c.message.as_deref();
                repr.metadata = c.metadata.as_ref();
            }
            TaskResult::Submitted(s) => {
                repr.message = s.message.as_deref();
                repr.metadata = s.metadata.as_ref();
                repr.submitted = Some(SubmittedRef {
                    webhook_url: &s.webhook_url,
                    operation_id: &s.operation_id,
                    task_id: &s.task_id,
                    partial_data: &s.partial_data,
                });
            }
            TaskResult::NeedsInput(n) => {
                repr.needs_input = Some(NeedsInputRef {
                    message: &n.message,
                    field: &n.field,
                });
            }
            TaskResult::Failed(f) => repr.error = Some(&f.error),
        }
        repr.serialize(serializer)
    }
}

#[derive(Deserialize)]
struct SubmittedOwned {
    #[serde(default)]
    webhook_url: Option<String>,
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    partial_data: Option<Value>,
}

#[derive(Deserialize)]
struct NeedsInputOwned {
    message: String,
    #[serde(default)]
    field: Option<String>,
}

#[derive(Deserialize)]
struct ResultOwned {
    status: TaskStatus,
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
    #[serde(default)]
    submitted: Option<SubmittedOwned>,
    #[serde(default)]
    needs_input: Option<NeedsInputOwned>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    debug_info: Option<DebugInfo>,
}

fn default_true() -> bool {
    true
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for TaskResult<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let repr = ResultOwned::deserialize(deserializer)?;
        let data = repr.data.filter(|d| !d.is_null());
        let populated = [
            data.is_some(),
            repr.submitted.is_some(),
            repr.needs_input.is_some(),
            repr.error.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();
        if populated != 1 {
            return Err(D::Error::custom(format!(
                "task result with status '{}' must carry exactly one payload, found {populated}",
                repr.status
            )));
        }

        let result = match repr.status {
            TaskStatus::Completed => {
                let data = data.ok_or_else(|| D::Error::custom("completed result has no data"))?;
                TaskResult::Completed(Completed {
                    data: serde_json::from_value(data).map_err(D::Error::custom)?,
                    success: repr.success,
                    message: repr.message,
                    metadata: repr.metadata,
                    debug_info: repr.debug_info,
                })
            }
            TaskStatus::Submitted => {
                let s = repr
                    .submitted
                    .ok_or_else(|| D::Error::custom("submitted result has no submitted info"))?;
                TaskResult::Submitted(Submitted {
                    webhook_url: s.webhook_url,
                    operation_id: s.operation_id,
                    task_id: s.task_id,
                    partial_data: s.partial_data.filter(|d| !d.is_null()),
                    message: repr.message,
                    metadata: repr.metadata,
                    debug_info: repr.debug_info,
                })
            }
            TaskStatus::NeedsInput => {
                let n = repr
                    .needs_input
                    .ok_or_else(|| D::Error::custom("needs_input result has no needs_input info"))?;
                TaskResult::NeedsInput(NeedsInput {
                    message: n.message,
                    field: n.field,
                    debug_info: repr.debug_info,
                })
            }
            TaskStatus::Failed => TaskResult::Failed(Failed {
                error: repr
                    .error
                    .ok_or_else(|| D::Error::custom("failed result has no error"))?,
                debug_info: repr.debug_info,
            }),
            TaskStatus::Working => {
                return Err(D::Error::custom("'working' is not a task result status"))
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_completed_serializes_flat() {
        let result = TaskResult::completed(json!({"products": []}));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"status": "completed", "success": true, "data": {"products": []}})
        );
        assert!(result.success());
        assert_eq!(result.error(), None);
    }

    #[test]
    fn test_failed_is_not_success() {
        let result: TaskResult<Value> = TaskResult::failed("boom");
        assert_eq!(result.status(), TaskStatus::Failed);
        assert!(!result.success());
        assert_eq!(result.error(), Some("boom"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": "failed", "success": false, "error": "boom"})
        );
    }

    #[test]
    fn test_submitted_roundtrip() {
        let result: TaskResult<Value> = TaskResult::Submitted(Submitted {
            webhook_url: Some("https://buyer.example.com/hook".into()),
            operation_id: Some("op_1".into()),
            ..Submitted::default()
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["submitted"]["webhook_url"], "https://buyer.example.com/hook");
        let back: TaskResult<Value> = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_submitted_keeps_partial_data() {
        let result: TaskResult<Value> = TaskResult::Submitted(Submitted {
            task_id: Some("task-7".into()),
            partial_data: Some(json!({"products": [{"product_id": "p1"}]})),
            ..Submitted::default()
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["submitted"]["partial_data"]["products"][0]["product_id"], "p1");
        assert!(value.get("data").is_none());
        let back: TaskResult<Value> = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_deserialize_rejects_mismatched_payloads() {
        assert!(serde_json::from_value::<TaskResult<Value>>(
            json!({"status": "completed", "data": null})
        )
        .is_err());
        assert!(serde_json::from_value::<TaskResult<Value>>(
            json!({"status": "failed", "data": {"x": 1}})
        )
        .is_err());
        assert!(serde_json::from_value::<TaskResult<Value>>(
            json!({"status": "completed", "data": {"x": 1}, "error": "also"})
        )
        .is_err());
        assert!(serde_json::from_value::<TaskResult<Value>>(
            json!({"status": "working", "data": {"x": 1}})
        )
        .is_err());
    }

    #[test]
    fn test_map_and_retype() {
        let result = TaskResult::completed(2).map(|n| n * 10);
        assert_eq!(result.data(), Some(&20));

        let failed: TaskResult<i32> = TaskResult::failed("x");
        let retyped: TaskResult<String> = failed.retype().unwrap();
        assert_eq!(retyped.error(), Some("x"));
        assert!(TaskResult::completed(1).retype::<String>().is_err());
    }
}
