//! Task reply — the envelope an A2A agent returns for `message/send`.
//!
//! ```text
//! SUBMITTED → WORKING → COMPLETED (terminal)
//!                     → FAILED (terminal)
//!                     → CANCELED (terminal)
//!                     → REJECTED (terminal)
//!                     → INPUT_REQUIRED (interrupted)
//!                     → AUTH_REQUIRED (interrupted)
//! ```
//!
//! The reply carries an ordered list of artifacts. Only the last artifact is
//! authoritative, and within it only the last data part. The wire protocol
//! defines no per-artifact status, so this ordering rule is a heuristic and
//! may need to change if the protocol grows one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::message::Message;

/// The reply to a `message/send` request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskReply {
    /// Task identifier assigned by the agent.
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Context identifier grouping related tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Lifecycle state, either a bare string or a status object. Absent
    /// status reads as an unrecognised state.
    #[serde(default)]
    pub status: TaskStatus,

    /// Artifacts produced so far, oldest first.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,

    /// Optional metadata attached by the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskReply {
    /// The lifecycle state of the task.
    pub fn state(&self) -> &TaskState {
        self.status.state()
    }

    /// The authoritative (last) artifact.
    pub fn authoritative_artifact(&self) -> Option<&Artifact> {
        self.artifacts.last()
    }

    /// The payload of the last data part of the last artifact.
    pub fn authoritative_data(&self) -> Result<&serde_json::Value, MissingData> {
        let artifact = self.artifacts.last().ok_or(MissingData::NoArtifacts)?;
        if artifact.parts.is_empty() {
            return Err(MissingData::NoParts);
        }
        artifact.last_data().ok_or(MissingData::NoDataPart)
    }

    /// Human-readable message: the last text part of the last artifact,
    /// falling back to the text of the status message.
    pub fn message(&self) -> Option<String> {
        if let Some(text) = self.artifacts.last().and_then(Artifact::last_text) {
            return Some(text.to_string());
        }
        self.status
            .message()
            .map(Message::text_content)
            .filter(|t| !t.is_empty())
    }
}

/// Why no authoritative data part could be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingData {
    /// The reply has no artifacts.
    NoArtifacts,
    /// The last artifact has no parts.
    NoParts,
    /// The last artifact has no data part.
    NoDataPart,
}

impl std::fmt::Display for MissingData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingData::NoArtifacts => write!(f, "reply has no artifacts"),
            MissingData::NoParts => write!(f, "last artifact has no parts"),
            MissingData::NoDataPart => write!(f, "last artifact has no data part"),
        }
    }
}

/// Task status as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TaskStatus {
    /// `"status": "completed"`
    State(TaskState),

    /// `"status": {"state": "completed", "message": {...}}`
    Detailed {
        state: TaskState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<Message>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::State(TaskState::Other(String::new()))
    }
}

impl TaskStatus {
    pub fn state(&self) -> &TaskState {
        match self {
            TaskStatus::State(state) => state,
            TaskStatus::Detailed { state, .. } => state,
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            TaskStatus::State(_) => None,
            TaskStatus::Detailed { message, .. } => message.as_ref(),
        }
    }
}

/// The state of a task in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Accepted but not yet started.
    Submitted,

    /// Actively being worked on.
    Working,

    /// Completed successfully (terminal).
    Completed,

    /// Failed (terminal).
    Failed,

    /// Canceled by the client (terminal).
    Canceled,

    /// Rejected by the agent (terminal).
    Rejected,

    /// Waiting for additional input from the client.
    InputRequired,

    /// Waiting for authentication/authorization.
    AuthRequired,

    /// A state this client does not recognise.
    #[serde(untagged)]
    Other(String),
}

impl TaskState {
    /// Check if the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }

    /// Check if the state is interrupted (needs input or auth).
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TaskState::InputRequired | TaskState::AuthRequired)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Submitted => write!(f, "submitted"),
            TaskState::Working => write!(f, "working"),
            TaskState::Completed => write!(f, "completed"),
            TaskState::Failed => write!(f, "failed"),
            TaskState::Canceled => write!(f, "canceled"),
            TaskState::Rejected => write!(f, "rejected"),
            TaskState::InputRequired => write!(f, "input-required"),
            TaskState::AuthRequired => write!(f, "auth-required"),
            TaskState::Other(other) => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reply(value: serde_json::Value) -> TaskReply {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_last_artifact_last_data_part_is_authoritative() {
        let r = reply(json!({
            "status": "completed",
            "taskId": "task-1",
            "contextId": "ctx-1",
            "artifacts": [
                {"parts": [{"kind": "data", "data": {"products": ["stale"]}}]},
                {"parts": [
                    {"kind": "data", "data": {"products": ["partial"]}},
                    {"kind": "text", "text": "Found one product"},
                    {"kind": "data", "data": {"products": ["final"]}}
                ]}
            ]
        }));
        assert_eq!(r.state(), &TaskState::Completed);
        assert_eq!(r.task_id.as_deref(), Some("task-1"));
        assert_eq!(r.authoritative_data().unwrap(), &json!({"products": ["final"]}));
        assert_eq!(r.message().as_deref(), Some("Found one product"));
    }

    #[test]
    fn test_missing_data_reasons() {
        let r = reply(json!({"status": "completed", "artifacts": []}));
        assert_eq!(r.authoritative_data(), Err(MissingData::NoArtifacts));

        let r = reply(json!({"status": "completed", "artifacts": [{"parts": []}]}));
        assert_eq!(r.authoritative_data(), Err(MissingData::NoParts));

        let r = reply(json!({
            "status": "completed",
            "artifacts": [{"parts": [{"kind": "text", "text": "only text"}]}]
        }));
        assert_eq!(r.authoritative_data(), Err(MissingData::NoDataPart));
    }

    #[test]
    fn test_status_object_and_unknown_state() {
        let r = reply(json!({
            "id": "task-9",
            "status": {
                "state": "failed",
                "message": {"role": "agent", "parts": [{"kind": "text", "text": "budget too low"}]}
            }
        }));
        assert_eq!(r.state(), &TaskState::Failed);
        assert_eq!(r.task_id.as_deref(), Some("task-9"));
        assert_eq!(r.message().as_deref(), Some("budget too low"));

        let r = reply(json!({"status": "queued-for-review"}));
        assert_eq!(r.state(), &TaskState::Other("queued-for-review".into()));
        assert!(!r.state().is_terminal());
    }

    #[test]
    fn test_missing_status_is_unrecognised_state() {
        let r = reply(json!({"taskId": "task-3", "artifacts": []}));
        assert_eq!(r.state(), &TaskState::Other(String::new()));
        assert!(!r.state().is_terminal());
        assert!(!r.state().is_interrupted());
    }

    #[test]
    fn test_malformed_earlier_parts_do_not_hide_authoritative_data() {
        let r = reply(json!({
            "status": "completed",
            "artifacts": [
                {"parts": [{"text": "progress 50%"}]},
                {"parts": [{"kind": "file", "uri": "https://cdn.example.com/a.pdf"}]},
                {"parts": [
                    {"kind": "file"},
                    {"kind": "data", "data": {"products": []}}
                ]}
            ]
        }));
        assert_eq!(r.authoritative_data().unwrap(), &json!({"products": []}));
    }

    #[test]
    fn test_state_classification() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Rejected.is_terminal());
        assert!(TaskState::InputRequired.is_interrupted());
        assert!(!TaskState::Working.is_terminal());
        assert_eq!(TaskState::InputRequired.to_string(), "input-required");
    }
}
