//! Message — the request unit sent to an A2A agent.
//!
//! A Message carries one or more kind-tagged Parts (text, structured data or
//! file). The same Part type appears inside reply artifacts.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A message sent to (or received from) an agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier for this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Role of the sender.
    pub role: MessageRole,

    /// Content parts of the message.
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Optional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// Create a message from the user (the buyer-side client).
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            message_id: Some(Uuid::new_v4().to_string()),
            role: MessageRole::User,
            parts,
            metadata: None,
        }
    }

    /// Build the message used to invoke a named AdCP skill.
    ///
    /// Carries a human-readable text part for agents that route on natural
    /// language, followed by a data part with the skill name and parameters
    /// for agents that route on structured input.
    pub fn tool_invocation(tool_name: &str, params: &serde_json::Value) -> Self {
        let pretty = serde_json::to_string_pretty(params).unwrap_or_else(|_| params.to_string());
        Self::user(vec![
            Part::text(format!("Execute tool: {tool_name}\nParameters: {pretty}")),
            Part::data(serde_json::json!({
                "skill": tool_name,
                "parameters": params,
            })),
        ])
    }

    /// Extract all text content from this message.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The client (buyer side).
    User,
    /// The remote agent.
    Agent,
}

/// A kind-tagged content part.
///
/// Parsing never fails: a part with no `kind`, an unknown `kind`, or a body
/// that does not fit its kind becomes [`Part::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    /// Plain text content.
    Text {
        #[serde(default)]
        text: String,
    },

    /// Structured JSON payload.
    Data {
        #[serde(default)]
        data: serde_json::Value,
    },

    /// File content (inline or by reference).
    File { file: FilePart },

    /// A part this client cannot read.
    Unknown,
}

/// Strict wire form of [`Part`].
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum WirePart {
    Text {
        #[serde(default)]
        text: String,
    },
    Data {
        #[serde(default)]
        data: serde_json::Value,
    },
    File {
        file: FilePart,
    },
    #[serde(other)]
    Unknown,
}

impl From<WirePart> for Part {
    fn from(part: WirePart) -> Self {
        match part {
            WirePart::Text { text } => Part::Text { text },
            WirePart::Data { data } => Part::Data { data },
            WirePart::File { file } => Part::File { file },
            WirePart::Unknown => Part::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match WirePart::deserialize(value) {
            Ok(part) => Ok(part.into()),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable message part");
                Ok(Part::Unknown)
            }
        }
    }
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a structured data part.
    pub fn data(data: serde_json::Value) -> Self {
        Self::Data { data }
    }

    /// The text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// The payload of a data part.
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Part::Data { data } => Some(data),
            _ => None,
        }
    }
}

/// File content, inline (base64) or by URI reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    /// Optional filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Base64-encoded inline bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,

    /// URI of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}
