//! Multi-agent fan-out with stub adapters.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use adcp_core::{
    AdcpClient, ActivityType, ClientOptions, GetProductsRequest, GetSignalsRequest,
    MultiAgentClient, ProtocolAdapter, TaskResult, TaskStatus,
};
use common::{agent, StubAdapter};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_one_unreachable_agent_does_not_affect_others() {
    let configs = [agent("alpha"), agent("beta"), agent("gamma")];
    let adapters = [
        StubAdapter::completed(&configs[0], json!({"products": [{"product_id": "a1", "name": "Alpha"}]})),
        StubAdapter::unreachable(&configs[1]),
        StubAdapter::completed(&configs[2], json!({"products": [{"product_id": "g1", "name": "Gamma"}]})),
    ];
    let clients = configs
        .iter()
        .zip(adapters.iter())
        .map(|(c, a)| AdcpClient::with_adapter(c.clone(), a.clone(), ClientOptions::default()))
        .collect();
    let multi = MultiAgentClient::from_clients(clients);

    let results = multi.get_products(&GetProductsRequest::with_brief("Coffee")).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].data().unwrap().products[0].product_id, "a1");
    assert_eq!(results[1].status(), TaskStatus::Failed);
    assert!(results[1].error().unwrap().contains("beta"));
    assert_eq!(results[2].data().unwrap().products[0].product_id, "g1");
    for adapter in &adapters {
        assert_eq!(adapter.calls.lock().unwrap()[0].0, "get_products");
    }
}

#[tokio::test]
async fn test_results_keep_agent_order_regardless_of_latency() {
    let slow = agent("slow");
    let fast = agent("fast");
    let slow_adapter = StubAdapter::completed(&slow, json!({"signals": []}));
    let fast_adapter = StubAdapter::completed(&fast, json!({"signals": [{
        "signal_agent_segment_id": "seg_1",
        "name": "Coffee lovers",
        "description": "Bought coffee in the last 30 days",
        "signal_type": "marketplace",
        "data_provider": "Acme Data",
        "coverage_percentage": 12.5,
        "deployments": [],
        "pricing": {"cpm": 2.0, "currency": "USD"}
    }]}));

    struct Delayed(Arc<StubAdapter>);

    #[async_trait::async_trait]
    impl ProtocolAdapter for Delayed {
        async fn call_tool(
            &self,
            tool: &str,
            params: serde_json::Value,
        ) -> adcp_core::AdcpResult<TaskResult<serde_json::Value>> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.call_tool(tool, params).await
        }

        async fn list_tools(&self) -> adcp_core::AdcpResult<Vec<String>> {
            self.0.list_tools().await
        }

        async fn agent_info(&self) -> adcp_core::AdcpResult<adcp_core::AgentInfo> {
            self.0.agent_info().await
        }

        async fn close(&self) -> adcp_core::AdcpResult<()> {
            self.0.close().await
        }
    }

    let multi = MultiAgentClient::from_clients(vec![
        AdcpClient::with_adapter(slow, Arc::new(Delayed(slow_adapter)), ClientOptions::default()),
        AdcpClient::with_adapter(fast, fast_adapter, ClientOptions::default()),
    ]);

    let request: GetSignalsRequest = serde_json::from_value(json!({
        "signal_spec": "Coffee buyers",
        "deliver_to": {"destinations": [{"type": "platform", "platform": "the-trade-desk"}], "countries": ["US"]}
    }))
    .unwrap();
    let results = multi.get_signals(&request).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].data().unwrap().signals.is_empty());
    assert_eq!(results[1].data().unwrap().signals.len(), 1);
}

#[tokio::test]
async fn test_scope_closes_every_agent() {
    let configs = [agent("alpha"), agent("beta")];
    let adapters = [
        StubAdapter::completed(&configs[0], json!({"products": []})),
        StubAdapter::completed(&configs[1], json!({"products": []})),
    ];
    let multi = MultiAgentClient::from_clients(
        configs
            .iter()
            .zip(adapters.iter())
            .map(|(c, a)| AdcpClient::with_adapter(c.clone(), a.clone(), ClientOptions::default()))
            .collect(),
    );

    let completed = multi
        .scope(|m| async move {
            m.get_products(&GetProductsRequest::default())
                .await
                .iter()
                .filter(|r| r.is_completed())
                .count()
        })
        .await;

    assert_eq!(completed, 2);
    assert!(adapters.iter().all(|a| a.close_count() == 1));
}

#[tokio::test]
async fn test_targeted_call_through_agent_lookup() {
    let configs = [agent("alpha"), agent("beta")];
    let alpha = StubAdapter::completed(&configs[0], json!({"products": []}));
    let beta = StubAdapter::completed(&configs[1], json!({"products": []}));
    let multi = MultiAgentClient::from_clients(vec![
        AdcpClient::with_adapter(configs[0].clone(), alpha.clone(), ClientOptions::default()),
        AdcpClient::with_adapter(configs[1].clone(), beta.clone(), ClientOptions::default()),
    ]);

    let result = multi
        .agent("beta")
        .unwrap()
        .get_products(&GetProductsRequest::default())
        .await;
    assert!(result.success());
    assert!(alpha.calls.lock().unwrap().is_empty());
    assert_eq!(beta.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_shared_options_reach_every_agent() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let options = ClientOptions::new().on_activity(move |a| {
        if a.activity_type == ActivityType::ProtocolResponse {
            sink.lock().unwrap().push(a.agent_id.clone());
        }
    });
    let configs = [agent("alpha"), agent("beta")];
    let multi = MultiAgentClient::from_clients(
        configs
            .iter()
            .map(|c| {
                AdcpClient::with_adapter(
                    c.clone(),
                    StubAdapter::completed(c, json!({"products": []})),
                    options.clone(),
                )
            })
            .collect(),
    );

    multi.get_products(&GetProductsRequest::default()).await;

    let mut agents = seen.lock().unwrap().clone();
    agents.sort();
    assert_eq!(agents, vec!["alpha".to_string(), "beta".to_string()]);
}
