//! Activity events and status handlers.
//!
//! Activities are fire-and-forget observability events emitted around
//! protocol boundaries. Status handlers are per-operation callbacks invoked
//! with raw response data when a task reaches a notable state, either
//! synchronously or through a webhook delivery.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    ProtocolRequest,
    ProtocolResponse,
    WebhookReceived,
    HandlerCalled,
    StatusChange,
}

/// An observability event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub operation_id: String,
    pub agent_id: String,
    /// Logical operation name, e.g. `get_products`.
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Activity {
    pub fn new(
        activity_type: ActivityType,
        operation_id: impl Into<String>,
        agent_id: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            activity_type,
            operation_id: operation_id.into(),
            agent_id: agent_id.into(),
            task_type: task_type.into(),
            status: None,
            timestamp: now_rfc3339(),
            metadata: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Kind of an out-of-band delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Scheduled,
    Final,
    Delayed,
}

/// Correlates a result or webhook delivery with the operation it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMetadata {
    pub operation_id: String,
    pub agent_id: String,
    pub task_type: String,
    pub status: TaskStatus,
    /// Position within a multi-part delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    pub timestamp: String,
}

/// Receives every activity a client emits.
pub type ActivityCallback = Arc<dyn Fn(&Activity) + Send + Sync>;

/// Receives raw response data for one operation.
pub type StatusHandler = Arc<dyn Fn(&Value, &WebhookMetadata) + Send + Sync>;

/// Status handlers keyed by operation name.
#[derive(Clone, Default)]
pub struct StatusHandlers {
    handlers: HashMap<String, StatusHandler>,
}

impl std::fmt::Debug for StatusHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("StatusHandlers")
            .field("operations", &names)
            .finish()
    }
}

impl StatusHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `task_type`, replacing any previous one.
    pub fn on(
        mut self,
        task_type: impl Into<String>,
        handler: impl Fn(&Value, &WebhookMetadata) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(task_type.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, task_type: &str) -> Option<&StatusHandler> {
        self.handlers.get(task_type)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke the handler for `metadata.task_type`, if any. Returns whether a
    /// handler ran to completion.
    pub fn dispatch(&self, data: &Value, metadata: &WebhookMetadata) -> bool {
        let Some(handler) = self.handlers.get(&metadata.task_type) else {
            return false;
        };
        match catch_unwind(AssertUnwindSafe(|| handler(data, metadata))) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    operation_id = %metadata.operation_id,
                    task_type = %metadata.task_type,
                    "Status handler panicked"
                );
                false
            }
        }
    }
}

/// Deliver `activity` to `callback`, swallowing panics.
pub(crate) fn emit(callback: Option<&ActivityCallback>, activity: Activity) {
    let Some(callback) = callback else {
        return;
    };
    if catch_unwind(AssertUnwindSafe(|| callback(&activity))).is_err() {
        tracing::warn!(
            operation_id = %activity.operation_id,
            activity = ?activity.activity_type,
            "Activity callback panicked"
        );
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn metadata(task_type: &str) -> WebhookMetadata {
        WebhookMetadata {
            operation_id: "op_1".into(),
            agent_id: "sales".into(),
            task_type: task_type.into(),
            status: TaskStatus::Completed,
            sequence_number: None,
            notification_type: Some(NotificationType::Final),
            timestamp: now_rfc3339(),
        }
    }

    #[test]
    fn test_activity_wire_shape() {
        let activity = Activity::new(ActivityType::ProtocolRequest, "op_1", "sales", "get_products")
            .with_status(TaskStatus::Submitted);
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["type"], "protocol_request");
        assert_eq!(value["status"], "submitted");
        assert!(chrono::DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_dispatch_matches_task_type() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handlers = StatusHandlers::new().on("create_media_buy", move |data, meta| {
            sink.lock().unwrap().push((data.clone(), meta.operation_id.clone()));
        });

        assert!(handlers.dispatch(&json!({"media_buy_id": "mb_1"}), &metadata("create_media_buy")));
        assert!(!handlers.dispatch(&json!({}), &metadata("get_products")));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(json!({"media_buy_id": "mb_1"}), "op_1".to_string())]
        );
    }

    #[test]
    fn test_panicking_callbacks_are_contained() {
        let handlers = StatusHandlers::new().on("get_products", |_, _| panic!("handler bug"));
        assert!(!handlers.dispatch(&json!({}), &metadata("get_products")));

        let callback: ActivityCallback = Arc::new(|_| panic!("callback bug"));
        emit(
            Some(&callback),
            Activity::new(ActivityType::HandlerCalled, "op_1", "sales", "get_products"),
        );
    }

    #[test]
    fn test_notification_type_wire_names() {
        let meta = metadata("sync_creatives");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["notification_type"], "final");
        let back: WebhookMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }
}
