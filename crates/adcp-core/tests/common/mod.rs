//! Stub adapters shared by the facade-level tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use adcp_core::protocols::{AgentInfo, ProtocolAdapter};
use adcp_core::{AdcpError, AdcpResult, AgentConfig, Protocol, TaskResult};
use async_trait::async_trait;
use serde_json::Value;

type Reply = Box<dyn Fn(&AgentConfig) -> AdcpResult<TaskResult<Value>> + Send + Sync>;

/// Answers every call the same way and records what it was asked.
pub struct StubAdapter {
    config: AgentConfig,
    reply: Reply,
    pub calls: Mutex<Vec<(String, Value)>>,
    pub closes: AtomicUsize,
}

impl StubAdapter {
    pub fn new(
        config: &AgentConfig,
        reply: impl Fn(&AgentConfig) -> AdcpResult<TaskResult<Value>> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: config.clone(),
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn completed(config: &AgentConfig, data: Value) -> Arc<Self> {
        Self::new(config, move |_| Ok(TaskResult::completed(data.clone())))
    }

    pub fn unreachable(config: &AgentConfig) -> Arc<Self> {
        Self::new(config, |cfg| {
            Err(AdcpError::connection(cfg, "connection refused"))
        })
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProtocolAdapter for StubAdapter {
    async fn call_tool(&self, tool: &str, params: Value) -> AdcpResult<TaskResult<Value>> {
        self.calls.lock().unwrap().push((tool.to_string(), params));
        (self.reply)(&self.config)
    }

    async fn list_tools(&self) -> AdcpResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn agent_info(&self) -> AdcpResult<AgentInfo> {
        Ok(AgentInfo {
            name: self.config.id.clone(),
            description: None,
            version: None,
            protocol: self.config.protocol,
            agent_uri: self.config.agent_uri.clone(),
            tools: Vec::new(),
            adcp_version: None,
            protocols_supported: Vec::new(),
        })
    }

    async fn close(&self) -> AdcpResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn agent(id: &str) -> AgentConfig {
    AgentConfig::builder(id, format!("https://{id}.example.com"), Protocol::A2a)
        .build()
        .unwrap()
}
