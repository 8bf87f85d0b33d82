//! MultiAgentClient — fan one operation out to many agents.

use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;

use crate::client::{AdcpClient, ClientOptions};
use crate::config::{AdcpConfig, AgentConfig};
use crate::error::{AdcpError, AdcpResult};
use crate::result::TaskResult;
use crate::types::*;

/// Clients for several agents, queried concurrently.
///
/// Results come back in agent order. One agent failing never affects the
/// others: its slot holds a `Failed` result.
#[derive(Debug, Clone)]
pub struct MultiAgentClient {
    clients: Vec<AdcpClient>,
}

macro_rules! fan_out_operations {
    ($($method:ident => $request:ty;)*) => {
        $(
            pub async fn $method(
                &self,
                request: &$request,
            ) -> Vec<TaskResult<<$request as AdcpRequest>::Response>> {
                self.execute(request).await
            }
        )*
    };
}

impl MultiAgentClient {
    /// Build one client per config, sharing `options`.
    pub fn new(configs: Vec<AgentConfig>, options: ClientOptions) -> AdcpResult<Self> {
        let mut seen = HashSet::new();
        for config in &configs {
            if !seen.insert(config.id.clone()) {
                return Err(AdcpError::Config(format!("duplicate agent id '{}'", config.id)));
            }
        }
        let clients = configs
            .into_iter()
            .map(|config| AdcpClient::with_options(config, options.clone()))
            .collect::<AdcpResult<Vec<_>>>()?;
        tracing::info!(agents = clients.len(), "Created multi-agent client");
        Ok(Self { clients })
    }

    pub fn from_config(config: &AdcpConfig) -> AdcpResult<Self> {
        config.validate()?;
        Self::new(config.agents.clone(), ClientOptions::from(config))
    }

    pub fn from_clients(clients: Vec<AdcpClient>) -> Self {
        Self { clients }
    }

    /// The client for one agent.
    pub fn agent(&self, id: &str) -> Option<&AdcpClient> {
        self.clients.iter().find(|c| c.agent_id() == id)
    }

    pub fn agent_ids(&self) -> Vec<&str> {
        self.clients.iter().map(AdcpClient::agent_id).collect()
    }

    pub fn clients(&self) -> &[AdcpClient] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Run `request` against every agent concurrently.
    pub async fn execute<R: AdcpRequest>(&self, request: &R) -> Vec<TaskResult<R::Response>> {
        tracing::debug!(
            tool = R::TOOL_NAME,
            agents = self.clients.len(),
            "Fanning out operation"
        );
        join_all(self.clients.iter().map(|client| client.execute(request))).await
    }

    fan_out_operations! {
        get_products => GetProductsRequest;
        list_creative_formats => ListCreativeFormatsRequest;
        list_authorized_properties => ListAuthorizedPropertiesRequest;
        sync_creatives => SyncCreativesRequest;
        list_creatives => ListCreativesRequest;
        preview_creative => PreviewCreativeRequest;
        build_creative => BuildCreativeRequest;
        create_media_buy => CreateMediaBuyRequest;
        update_media_buy => UpdateMediaBuyRequest;
        get_media_buy_delivery => GetMediaBuyDeliveryRequest;
        provide_performance_feedback => ProvidePerformanceFeedbackRequest;
        get_signals => GetSignalsRequest;
        activate_signal => ActivateSignalRequest;
    }

    /// Close every client. All are closed even if some fail; the first
    /// error is returned.
    pub async fn close(&self) -> AdcpResult<()> {
        let results = join_all(self.clients.iter().map(|client| client.close())).await;
        results.into_iter().collect::<AdcpResult<Vec<()>>>().map(|_| ())
    }

    /// Run `f`, then close every client, also when `f` panics.
    pub async fn scope<'a, F, Fut, T>(&'a self, f: F) -> T
    where
        F: FnOnce(&'a Self) -> Fut,
        Fut: Future<Output = T> + 'a,
    {
        let outcome = AssertUnwindSafe(f(self)).catch_unwind().await;
        if let Err(e) = self.close().await {
            tracing::warn!(error = %e, "Error closing agents at end of scope");
        }
        match outcome {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
