//! Agent Card — the self-describing metadata document for agent discovery.
//!
//! A2A agents publish their card at `/.well-known/agent.json`. AdCP agents
//! declare the AdCP version and the AdCP protocols they implement through an
//! `adcp` extension, either as a top-level `extensions.adcp` object or as a
//! capability extension whose URI mentions `adcp`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of the agent card relative to the agent's base URI.
pub const WELL_KNOWN_AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// An A2A Agent Card. Only the fields this client reads are modelled; the
/// parser tolerates everything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Human-readable name of the agent.
    #[serde(default)]
    pub name: String,

    /// Description of what the agent does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Semantic version of the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Primary endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Capabilities declared by this agent.
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Skills (callable operations) of this agent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<AgentSkill>,

    /// Named protocol extensions, keyed by extension name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AgentCard {
    /// Names of all declared skills, skipping unnamed ones.
    pub fn skill_names(&self) -> Vec<String> {
        self.skills
            .iter()
            .filter(|s| !s.name.is_empty())
            .map(|s| s.name.clone())
            .collect()
    }

    /// Find a skill by ID.
    pub fn find_skill(&self, skill_id: &str) -> Option<&AgentSkill> {
        self.skills.iter().find(|s| s.id == skill_id)
    }

    /// The AdCP extension metadata, if the agent declares it.
    pub fn adcp_extension(&self) -> Option<AdcpExtension> {
        let from_map = self
            .extensions
            .as_ref()
            .and_then(|m| m.get("adcp"))
            .cloned();
        let from_capabilities = || {
            self.capabilities
                .extensions
                .iter()
                .find(|e| e.uri.contains("adcp"))
                .and_then(|e| e.params.clone())
        };
        from_map
            .or_else(from_capabilities)
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

/// Capabilities declared by the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether the agent supports SSE streaming.
    #[serde(default)]
    pub streaming: bool,

    /// Whether the agent supports push notifications (webhooks).
    #[serde(default)]
    pub push_notifications: bool,

    /// Declared extensions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<AgentExtension>,
}

/// An extension declared in the agent's capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentExtension {
    /// URI identifying this extension.
    pub uri: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this extension is required for interaction.
    #[serde(default)]
    pub required: bool,

    /// Extension-specific parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A specific skill of the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Unique identifier for this skill.
    #[serde(default)]
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Description of what this skill does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tags for categorization and search.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// AdCP-specific extension metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdcpExtension {
    /// AdCP specification version implemented by the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adcp_version: Option<String>,

    /// AdCP protocols implemented (e.g. "media_buy", "signals", "creative").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols_supported: Vec<String>,
}
