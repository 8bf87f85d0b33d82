//! Audience signals: discovery and activation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::ErrorDetail;
use super::response_union;

/// Where a signal should be made available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    Platform {
        platform: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
    },
    Agent {
        agent_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
    },
}

/// Where a signal is (or is being) deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Deployment {
    Platform {
        platform: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
        is_live: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation_key: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimated_activation_duration_minutes: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deployed_at: Option<String>,
    },
    Agent {
        agent_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
        is_live: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation_key: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimated_activation_duration_minutes: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deployed_at: Option<String>,
    },
}

impl Deployment {
    pub fn is_live(&self) -> bool {
        match self {
            Deployment::Platform { is_live, .. } | Deployment::Agent { is_live, .. } => *is_live,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogType {
    Marketplace,
    Custom,
    Owned,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SignalFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_types: Option<Vec<CatalogType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_providers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cpm: Option<f64>,
    /// 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_coverage_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeliverTo {
    pub destinations: Vec<Destination>,
    /// ISO 3166-1 alpha-2 codes.
    pub countries: Vec<String>,
}

// ── get_signals ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetSignalsRequest {
    /// Natural-language description of the audience.
    pub signal_spec: String,
    pub deliver_to: DeliverTo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SignalFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_agent_segment_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployments: Option<Vec<Deployment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSignalsResponse {
    pub signals: Vec<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── activate_signal ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActivateSignalRequest {
    pub signal_agent_segment_id: String,
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivateSignalSuccess {
    pub deployments: Vec<Deployment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

response_union!(ActivateSignalResponse, ActivateSignalSuccess);
