//! Creative library, previews and generative builds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{ErrorDetail, FormatId, Pagination, PushNotificationConfig};
use super::response_union;

/// A creative as submitted to `sync_creatives`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreativeAsset {
    pub creative_id: String,
    pub name: String,
    pub format_id: FormatId,
    /// Assets keyed by the format's asset role.
    #[serde(default)]
    pub assets: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    Strict,
    Lenient,
}

// ── sync_creatives ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SyncCreativesRequest {
    pub creatives: Vec<CreativeAsset>,
    /// Update only the provided fields of existing creatives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<bool>,
    /// Creative id to package ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<std::collections::BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_missing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_mode: Option<ValidationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
    Unchanged,
    Failed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncCreativeResult {
    pub creative_id: String,
    pub action: SyncAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncCreativesSuccess {
    pub creatives: Vec<SyncCreativeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

response_union!(
    /// Per-creative outcomes, or the errors that prevented the sync.
    SyncCreativesResponse,
    SyncCreativesSuccess
);

// ── list_creatives ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CreativeStatus {
    Processing,
    PendingReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreativeFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<CreativeStatus>>,
    /// All tags must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Any tag may match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_any: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_packages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unassigned: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreativeSort {
    pub field: String,
    /// `asc` or `desc`.
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListCreativesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<CreativeFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<CreativeSort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_assignments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_performance: Option<bool>,
    /// Restrict returned fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    pub creative_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_id: Option<FormatId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CreativeStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCreativesResponse {
    pub creatives: Vec<Creative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_summary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── preview_creative ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PreviewCreativeRequest {
    pub format_id: FormatId,
    pub creative_manifest: Value,
    /// Named input sets, one preview per set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewCreativeResponse {
    pub previews: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── build_creative ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BuildCreativeRequest {
    pub target_format_id: FormatId,
    /// Natural-language instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Source manifest to transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_manifest: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildCreativeSuccess {
    pub creative_manifest: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

response_union!(BuildCreativeResponse, BuildCreativeSuccess);
