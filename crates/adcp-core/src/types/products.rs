//! Product discovery, creative formats and authorized properties.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{DeliveryType, ErrorDetail, FormatId, FormatType};

// ── get_products ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<DeliveryType>,
    /// Fixed price rather than auction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fixed_price: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_types: Option<Vec<FormatType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_ids: Option<Vec<FormatId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_formats_only: Option<bool>,
    /// Minimum impressions needed for measurement validity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_exposures: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetProductsRequest {
    /// Natural-language description of the campaign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_manifest: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ProductFilters>,
}

impl GetProductsRequest {
    pub fn with_brief(brief: impl Into<String>) -> Self {
        Self {
            brief: Some(brief.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<DeliveryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_ids: Option<Vec<FormatId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_options: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetProductsResponse {
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── list_creative_formats ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListCreativeFormatsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_ids: Option<Vec<FormatId>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<FormatType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_responsive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub format_id: FormatId,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<FormatType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCreativeFormatsResponse {
    pub formats: Vec<Format>,
    /// Other creative agents that define formats this agent accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_agents: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── list_authorized_properties ───────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListAuthorizedPropertiesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_domains: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAuthorizedPropertiesResponse {
    pub publisher_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_channels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertising_policies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
