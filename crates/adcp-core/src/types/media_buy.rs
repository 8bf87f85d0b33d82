//! Media buys: creation, updates, delivery reporting, performance feedback.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{DateRange, ErrorDetail, FormatId, PushNotificationConfig};
use super::response_union;

/// A package to buy within a media buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PackageRequest {
    pub buyer_ref: String,
    pub product_id: String,
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_option_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_ids: Option<Vec<FormatId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting_overlay: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_price: Option<f64>,
}

// ── create_media_buy ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMediaBuyRequest {
    /// Buyer's own reference for the media buy.
    pub buyer_ref: String,
    pub packages: Vec<PackageRequest>,
    pub brand_manifest: Value,
    /// ISO 8601, or `asap`.
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_webhook: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMediaBuySuccess {
    pub media_buy_id: String,
    pub buyer_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

response_union!(
    /// The created buy, or the errors that prevented it.
    CreateMediaBuyResponse,
    CreateMediaBuySuccess
);

// ── update_media_buy ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PackageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting_overlay: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_ids: Option<Vec<String>>,
}

/// Identify the buy by `media_buy_id` or `buyer_ref`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMediaBuyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_buy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_ref: Option<String>,
    /// Pause (`false`) or resume (`true`) the whole buy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<PackageUpdate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMediaBuySuccess {
    pub media_buy_id: String,
    pub buyer_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_packages: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

response_union!(UpdateMediaBuyResponse, UpdateMediaBuySuccess);

// ── get_media_buy_delivery ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetMediaBuyDeliveryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_buy_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_refs: Option<Vec<String>>,
    /// A single status or a list of statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<Value>,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaBuyDelivery {
    pub media_buy_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_package: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetMediaBuyDeliveryResponse {
    pub media_buy_deliveries: Vec<MediaBuyDelivery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_period: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_totals: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── provide_performance_feedback ─────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProvidePerformanceFeedbackRequest {
    pub media_buy_id: String,
    pub measurement_period: DateRange,
    /// 1.0 is expected performance; above is better.
    pub performance_index: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidePerformanceFeedbackResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
