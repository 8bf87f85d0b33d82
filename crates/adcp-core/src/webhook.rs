//! Webhook URLs, signatures and delivery parsing.
//!
//! Agents deliver the eventual result of a submitted task by POSTing to the
//! webhook URL the client handed out. When a shared secret is configured the
//! delivery carries `sha256=<hex>`, an HMAC-SHA256 of the raw body.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::activity::{now_rfc3339, NotificationType, WebhookMetadata};
use crate::error::{AdcpError, AdcpResult};
use crate::result::TaskStatus;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Sign `body` with `secret`, producing `sha256=<hex>`.
pub fn sign_payload(secret: &str, body: &[u8]) -> AdcpResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AdcpError::Config(format!("invalid webhook secret: {e}")))?;
    mac.update(body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check `signature` against `body` in constant time. The `sha256=` prefix
/// is optional.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let hex_digest = signature
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .unwrap_or(signature.trim());
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Fill `{agent_id}`, `{task_type}` and `{operation_id}` in `template`.
pub fn render_webhook_url(
    template: &str,
    agent_id: &str,
    task_type: &str,
    operation_id: &str,
) -> String {
    template
        .replace("{agent_id}", agent_id)
        .replace("{task_type}", task_type)
        .replace("{operation_id}", operation_id)
}

/// Body of a webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub task_type: String,
    pub status: TaskStatus,
    /// The operation's response, in whole or in part.
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl WebhookPayload {
    pub fn metadata(&self, agent_id: &str) -> AdcpResult<WebhookMetadata> {
        let operation_id = self
            .operation_id
            .clone()
            .or_else(|| self.task_id.clone())
            .ok_or_else(|| AdcpError::Webhook {
                agent_id: agent_id.to_string(),
                message: "delivery has neither operation_id nor task_id".into(),
            })?;
        Ok(WebhookMetadata {
            operation_id,
            agent_id: agent_id.to_string(),
            task_type: self.task_type.clone(),
            status: self.status,
            sequence_number: self.sequence_number,
            notification_type: self.notification_type,
            timestamp: self.timestamp.clone().unwrap_or_else(now_rfc3339),
        })
    }
}

/// Verify and parse a delivery for `agent_id`.
///
/// With a secret configured, a missing or wrong signature is rejected.
pub fn parse_delivery(
    agent_id: &str,
    body: &[u8],
    signature: Option<&str>,
    secret: Option<&str>,
) -> AdcpResult<(WebhookPayload, WebhookMetadata)> {
    if let Some(secret) = secret {
        let signature = signature.ok_or_else(|| AdcpError::WebhookSignature {
            agent_id: agent_id.to_string(),
            message: "missing signature".into(),
        })?;
        if !verify_signature(secret, body, signature) {
            return Err(AdcpError::WebhookSignature {
                agent_id: agent_id.to_string(),
                message: "signature does not match payload".into(),
            });
        }
    }

    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|e| AdcpError::Webhook {
            agent_id: agent_id.to_string(),
            message: format!("malformed delivery: {e}"),
        })?;
    let metadata = payload.metadata(agent_id)?;
    Ok((payload, metadata))
}
