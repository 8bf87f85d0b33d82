//! Artifact — outputs produced by a task.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::message::Part;

/// An artifact produced by a task.
///
/// Artifacts contain the deliverables of the agent's work. AdCP agents put
/// the structured operation response in a data part and an optional
/// human-readable summary in a text part.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Identifier for this artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,

    /// Human-readable name/title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description of what this artifact contains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The content parts of this artifact.
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Optional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Artifact {
    /// Create an artifact holding the given parts.
    pub fn with_parts(parts: Vec<Part>) -> Self {
        Self {
            parts,
            ..Self::default()
        }
    }

    /// The last data part's payload. Earlier data parts are superseded.
    pub fn last_data(&self) -> Option<&serde_json::Value> {
        self.parts.iter().rev().find_map(Part::as_data)
    }

    /// The last text part's text.
    pub fn last_text(&self) -> Option<&str> {
        self.parts.iter().rev().find_map(Part::as_text)
    }

    /// Extract text content from this artifact.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
