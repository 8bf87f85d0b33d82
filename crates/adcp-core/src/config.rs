//! Configuration for AdCP agents and clients.
//!
//! An [`AgentConfig`] describes one counterpart agent. An [`AdcpConfig`]
//! groups several agents with client-wide webhook and telemetry settings and
//! can be loaded from TOML or from `ADCP_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub use adcp_mcp::TransportKind as McpTransportKind;

use crate::error::{AdcpError, AdcpResult};

/// Wire protocol an agent speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    A2a,
    Mcp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::A2a => write!(f, "a2a"),
            Protocol::Mcp => write!(f, "mcp"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = AdcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a2a" => Ok(Protocol::A2a),
            "mcp" => Ok(Protocol::Mcp),
            other => Err(AdcpError::Config(format!(
                "unknown protocol '{other}' (expected 'a2a' or 'mcp')"
            ))),
        }
    }
}

/// How the auth token is written into the auth header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// The raw token.
    #[default]
    Token,
    /// `Bearer <token>`.
    Bearer,
}

/// Configuration for one counterpart agent.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Stable identifier used in logs, activities and webhook URLs.
    pub id: String,

    /// Base URI of the agent.
    pub agent_uri: String,

    pub protocol: Protocol,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Header carrying the token.
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    #[serde(default)]
    pub auth_type: AuthType,

    /// Bound on every outbound exchange, in seconds on the wire.
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// MCP transport; ignored for A2A agents.
    #[serde(default)]
    pub mcp_transport: McpTransportKind,

    /// Capture request/response traces on every result.
    #[serde(default)]
    pub debug: bool,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("id", &self.id)
            .field("agent_uri", &self.agent_uri)
            .field("protocol", &self.protocol)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("auth_header", &self.auth_header)
            .field("auth_type", &self.auth_type)
            .field("timeout", &self.timeout)
            .field("mcp_transport", &self.mcp_transport)
            .field("debug", &self.debug)
            .finish()
    }
}

fn default_auth_header() -> String {
    "x-adcp-auth".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl AgentConfig {
    /// Start building a config for the given agent.
    pub fn builder(
        id: impl Into<String>,
        agent_uri: impl Into<String>,
        protocol: Protocol,
    ) -> AgentConfigBuilder {
        AgentConfigBuilder::new(id, agent_uri, protocol)
    }

    /// Check what a deserialized config may not satisfy.
    pub fn validate(&self) -> AdcpResult<()> {
        if self.id.trim().is_empty() {
            return Err(AdcpError::Config("agent id must not be empty".into()));
        }
        let uri = Url::parse(&self.agent_uri).map_err(|e| {
            AdcpError::Config(format!(
                "agent {}: invalid agent_uri '{}': {e}",
                self.id, self.agent_uri
            ))
        })?;
        if !matches!(uri.scheme(), "http" | "https") {
            return Err(AdcpError::Config(format!(
                "agent {}: unsupported URI scheme '{}'",
                self.id,
                uri.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(AdcpError::Config(format!(
                "agent {}: timeout must be positive",
                self.id
            )));
        }
        if self.auth_header.trim().is_empty() {
            return Err(AdcpError::Config(format!(
                "agent {}: auth_header must not be empty",
                self.id
            )));
        }
        Ok(())
    }

    /// The auth header name and value, if a token is configured.
    pub fn auth_header_pair(&self) -> Option<(String, String)> {
        let token = self.auth_token.as_deref()?;
        let value = match self.auth_type {
            AuthType::Bearer => format!("Bearer {token}"),
            AuthType::Token => token.to_string(),
        };
        Some((self.auth_header.clone(), value))
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    pub fn new(id: impl Into<String>, agent_uri: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            config: AgentConfig {
                id: id.into(),
                agent_uri: agent_uri.into(),
                protocol,
                auth_token: None,
                auth_header: default_auth_header(),
                auth_type: AuthType::default(),
                timeout: default_timeout(),
                mcp_transport: McpTransportKind::default(),
                debug: false,
            },
        }
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Send the token as `Authorization: Bearer <token>`.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self.config.auth_header = "Authorization".into();
        self.config.auth_type = AuthType::Bearer;
        self
    }

    pub fn auth_header(mut self, header: impl Into<String>) -> Self {
        self.config.auth_header = header.into();
        self
    }

    pub fn auth_type(mut self, auth_type: AuthType) -> Self {
        self.config.auth_type = auth_type;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn mcp_transport(mut self, transport: McpTransportKind) -> Self {
        self.config.mcp_transport = transport;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn build(self) -> AdcpResult<AgentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Top-level configuration: a set of agents plus client-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdcpConfig {
    #[serde(default)]
    pub agents: Vec<AgentConfig>,

    /// Template for webhook URLs; see [`crate::webhook::render_webhook_url`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url_template: Option<String>,

    /// Shared secret for webhook signatures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AdcpConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> AdcpResult<Self> {
        let config: AdcpConfig =
            toml::from_str(input).map_err(|e| AdcpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build a single-agent config from `ADCP_*` environment variables.
    ///
    /// Reads `ADCP_AGENT_ID`, `ADCP_AGENT_URI`, `ADCP_PROTOCOL` (default
    /// `mcp`), `ADCP_AUTH_TOKEN` and `ADCP_WEBHOOK_URL_TEMPLATE`.
    pub fn from_env() -> AdcpResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`AdcpConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AdcpResult<Self> {
        let agent_uri = lookup("ADCP_AGENT_URI")
            .ok_or_else(|| AdcpError::Config("ADCP_AGENT_URI is not set".into()))?;
        let id = lookup("ADCP_AGENT_ID").unwrap_or_else(|| "default".into());
        let protocol: Protocol = lookup("ADCP_PROTOCOL")
            .as_deref()
            .unwrap_or("mcp")
            .parse()?;

        let mut builder = AgentConfig::builder(id, agent_uri, protocol);
        if let Some(token) = lookup("ADCP_AUTH_TOKEN") {
            builder = builder.auth_token(token);
        }

        Ok(Self {
            agents: vec![builder.build()?],
            webhook_url_template: lookup("ADCP_WEBHOOK_URL_TEMPLATE"),
            webhook_secret: None,
            telemetry: TelemetryConfig::default(),
        })
    }

    /// Validate every agent and reject duplicate ids.
    pub fn validate(&self) -> AdcpResult<()> {
        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            agent.validate()?;
            if !seen.insert(agent.id.as_str()) {
                return Err(AdcpError::Config(format!(
                    "duplicate agent id '{}'",
                    agent.id
                )));
            }
        }
        Ok(())
    }

    /// Look up an agent by id.
    pub fn agent(&self, id: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|a| a.id == id)
    }
}

/// Telemetry/observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to export spans over OTLP.
    #[serde(default)]
    pub enabled: bool,

    /// OTLP exporter endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Log filter directive; `RUST_LOG` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
            service_name: default_service_name(),
            log_filter: None,
        }
    }
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}

fn default_service_name() -> String {
    "adcp-client".into()
}

/// Durations as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
