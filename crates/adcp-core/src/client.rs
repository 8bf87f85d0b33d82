//! AdcpClient — the per-agent entry point.
//!
//! A client owns one protocol adapter chosen from the agent's config and
//! exposes one typed method per AdCP operation. Every method returns a
//! [`TaskResult`]; a failed remote call is a `Failed` result, never an `Err`.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::activity::{
    emit, now_rfc3339, Activity, ActivityCallback, ActivityType, StatusHandlers, WebhookMetadata,
};
use crate::config::{AdcpConfig, AgentConfig};
use crate::error::AdcpResult;
use crate::normalize::normalize;
use crate::protocols::{adapter_for, AgentInfo, ProtocolAdapter};
use crate::result::TaskResult;
use crate::simple::SimpleApi;
use crate::types::*;
use crate::webhook::{parse_delivery, render_webhook_url};

/// Options shared by every client built from the same setup.
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Template for webhook URLs handed out with submitted tasks.
    pub webhook_url_template: Option<String>,
    /// Secret for verifying webhook signatures.
    pub webhook_secret: Option<String>,
    pub on_activity: Option<ActivityCallback>,
    pub handlers: StatusHandlers,
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("webhook_url_template", &self.webhook_url_template)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("on_activity", &self.on_activity.is_some())
            .field("handlers", &self.handlers)
            .finish()
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn webhook_url_template(mut self, template: impl Into<String>) -> Self {
        self.webhook_url_template = Some(template.into());
        self
    }

    pub fn webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    pub fn on_activity(mut self, callback: impl Fn(&Activity) + Send + Sync + 'static) -> Self {
        self.on_activity = Some(Arc::new(callback));
        self
    }

    /// Register a status handler for `task_type`.
    pub fn on_status(
        mut self,
        task_type: impl Into<String>,
        handler: impl Fn(&Value, &WebhookMetadata) + Send + Sync + 'static,
    ) -> Self {
        self.handlers = self.handlers.on(task_type, handler);
        self
    }

    pub fn handlers(mut self, handlers: StatusHandlers) -> Self {
        self.handlers = handlers;
        self
    }
}

impl From<&AdcpConfig> for ClientOptions {
    fn from(config: &AdcpConfig) -> Self {
        Self {
            webhook_url_template: config.webhook_url_template.clone(),
            webhook_secret: config.webhook_secret.clone(),
            ..Self::default()
        }
    }
}

/// Client for one AdCP agent.
#[derive(Clone)]
pub struct AdcpClient {
    config: Arc<AgentConfig>,
    adapter: Arc<dyn ProtocolAdapter>,
    options: ClientOptions,
}

impl std::fmt::Debug for AdcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdcpClient")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish()
    }
}

impl AdcpClient {
    pub fn new(config: AgentConfig) -> AdcpResult<Self> {
        Self::with_options(config, ClientOptions::default())
    }

    pub fn with_options(config: AgentConfig, options: ClientOptions) -> AdcpResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let adapter = adapter_for(config.clone());
        Ok(Self {
            config,
            adapter,
            options,
        })
    }

    /// Build a client around a caller-supplied adapter.
    pub fn with_adapter(
        config: AgentConfig,
        adapter: Arc<dyn ProtocolAdapter>,
        options: ClientOptions,
    ) -> Self {
        Self {
            config: Arc::new(config),
            adapter,
            options,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn agent_id(&self) -> &str {
        &self.config.id
    }

    /// Keyword-style accessor that unwraps results into data or errors.
    pub fn simple(&self) -> SimpleApi<'_> {
        SimpleApi::new(self)
    }

    // ── Operations ───────────────────────────────────────────

    /// Run any typed operation.
    pub async fn execute<R: AdcpRequest>(&self, request: &R) -> TaskResult<R::Response> {
        let params = match serde_json::to_value(request) {
            Ok(params) => params,
            Err(e) => return TaskResult::failed(format!("Failed to serialize request: {e}")),
        };
        let (operation_id, raw) = self.dispatch(R::TOOL_NAME, params).await;
        let typed = normalize::<R::Response>(raw);
        self.notify_handlers(R::TOOL_NAME, &operation_id, &typed);
        typed
    }

    /// Call a tool by name, without typing the response.
    pub async fn call_tool(&self, tool: &str, params: Value) -> TaskResult<Value> {
        let (operation_id, raw) = self.dispatch(tool, params).await;
        self.notify_handlers(tool, &operation_id, &raw);
        raw
    }

    pub async fn get_products(&self, request: &GetProductsRequest) -> TaskResult<GetProductsResponse> {
        self.execute(request).await
    }

    pub async fn list_creative_formats(
        &self,
        request: &ListCreativeFormatsRequest,
    ) -> TaskResult<ListCreativeFormatsResponse> {
        self.execute(request).await
    }

    pub async fn list_authorized_properties(
        &self,
        request: &ListAuthorizedPropertiesRequest,
    ) -> TaskResult<ListAuthorizedPropertiesResponse> {
        self.execute(request).await
    }

    pub async fn sync_creatives(
        &self,
        request: &SyncCreativesRequest,
    ) -> TaskResult<SyncCreativesResponse> {
        self.execute(request).await
    }

    pub async fn list_creatives(
        &self,
        request: &ListCreativesRequest,
    ) -> TaskResult<ListCreativesResponse> {
        self.execute(request).await
    }

    pub async fn preview_creative(
        &self,
        request: &PreviewCreativeRequest,
    ) -> TaskResult<PreviewCreativeResponse> {
        self.execute(request).await
    }

    /// Generate or transform a creative manifest.
    pub async fn build_creative(
        &self,
        request: &BuildCreativeRequest,
    ) -> TaskResult<BuildCreativeResponse> {
        self.execute(request).await
    }

    pub async fn create_media_buy(
        &self,
        request: &CreateMediaBuyRequest,
    ) -> TaskResult<CreateMediaBuyResponse> {
        self.execute(request).await
    }

    pub async fn update_media_buy(
        &self,
        request: &UpdateMediaBuyRequest,
    ) -> TaskResult<UpdateMediaBuyResponse> {
        self.execute(request).await
    }

    pub async fn get_media_buy_delivery(
        &self,
        request: &GetMediaBuyDeliveryRequest,
    ) -> TaskResult<GetMediaBuyDeliveryResponse> {
        self.execute(request).await
    }

    pub async fn provide_performance_feedback(
        &self,
        request: &ProvidePerformanceFeedbackRequest,
    ) -> TaskResult<ProvidePerformanceFeedbackResponse> {
        self.execute(request).await
    }

    pub async fn get_signals(&self, request: &GetSignalsRequest) -> TaskResult<GetSignalsResponse> {
        self.execute(request).await
    }

    pub async fn activate_signal(
        &self,
        request: &ActivateSignalRequest,
    ) -> TaskResult<ActivateSignalResponse> {
        self.execute(request).await
    }

    // ── Discovery ────────────────────────────────────────────

    pub async fn list_tools(&self) -> AdcpResult<Vec<String>> {
        self.adapter.list_tools().await
    }

    pub async fn get_agent_info(&self) -> AdcpResult<AgentInfo> {
        self.adapter.agent_info().await
    }

    // ── Lifecycle ────────────────────────────────────────────

    /// Release the connection. The next call reconnects.
    pub async fn close(&self) -> AdcpResult<()> {
        tracing::debug!(agent_id = %self.config.id, "Closing client");
        self.adapter.close().await
    }

    /// Run `f` with this client, then close it, also when `f` panics.
    pub async fn scope<'a, F, Fut, T>(&'a self, f: F) -> T
    where
        F: FnOnce(&'a Self) -> Fut,
        Fut: Future<Output = T> + 'a,
    {
        let outcome = AssertUnwindSafe(f(self)).catch_unwind().await;
        if let Err(e) = self.close().await {
            tracing::warn!(agent_id = %self.config.id, error = %e, "Error closing client at end of scope");
        }
        match outcome {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    // ── Webhooks ─────────────────────────────────────────────

    /// The webhook URL for one operation, if a template is configured.
    pub fn webhook_url(&self, task_type: &str, operation_id: &str) -> Option<String> {
        self.options
            .webhook_url_template
            .as_deref()
            .map(|t| render_webhook_url(t, &self.config.id, task_type, operation_id))
    }

    /// Verify and dispatch an incoming webhook delivery.
    pub fn handle_webhook(&self, body: &[u8], signature: Option<&str>) -> AdcpResult<WebhookMetadata> {
        let (payload, metadata) = parse_delivery(
            &self.config.id,
            body,
            signature,
            self.options.webhook_secret.as_deref(),
        )?;
        tracing::info!(
            agent_id = %self.config.id,
            operation_id = %metadata.operation_id,
            task_type = %metadata.task_type,
            status = %metadata.status,
            "Webhook received"
        );
        self.emit(
            Activity::new(
                ActivityType::WebhookReceived,
                &metadata.operation_id,
                &self.config.id,
                &metadata.task_type,
            )
            .with_status(metadata.status),
        );

        let data = payload.result.unwrap_or(Value::Null);
        if self.options.handlers.dispatch(&data, &metadata) {
            self.emit_handler_called(&metadata);
        }
        Ok(metadata)
    }

    // ── Internal ─────────────────────────────────────────────

    async fn dispatch(&self, tool: &str, params: Value) -> (String, TaskResult<Value>) {
        let operation_id = format!("op_{}", Uuid::new_v4().simple());
        self.emit(Activity::new(
            ActivityType::ProtocolRequest,
            &operation_id,
            &self.config.id,
            tool,
        ));

        let started = Instant::now();
        let mut result = match self.adapter.call_tool(tool, params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    agent_id = %self.config.id,
                    operation_id = %operation_id,
                    tool = %tool,
                    error = %e,
                    "Operation failed"
                );
                TaskResult::failed(e.to_string())
            }
        };

        if let TaskResult::Submitted(submitted) = &mut result {
            submitted
                .operation_id
                .get_or_insert_with(|| operation_id.clone());
            if submitted.webhook_url.is_none() {
                submitted.webhook_url = self.webhook_url(tool, &operation_id);
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            agent_id = %self.config.id,
            operation_id = %operation_id,
            tool = %tool,
            status = %result.status(),
            elapsed_ms,
            "Operation finished"
        );
        let mut metadata = Map::new();
        metadata.insert("duration_ms".into(), json!(elapsed_ms));
        if let Some(error) = result.error() {
            metadata.insert("error".into(), json!(error));
        }
        self.emit(
            Activity::new(
                ActivityType::ProtocolResponse,
                &operation_id,
                &self.config.id,
                tool,
            )
            .with_status(result.status())
            .with_metadata(metadata),
        );
        (operation_id, result)
    }

    /// Hand the outcome of a synchronous call to the matching handler.
    fn notify_handlers<T: Serialize>(&self, tool: &str, operation_id: &str, result: &TaskResult<T>) {
        if self.options.handlers.get(tool).is_none() {
            return;
        }
        let data = match result {
            TaskResult::Completed(c) => serde_json::to_value(&c.data).unwrap_or(Value::Null),
            TaskResult::Submitted(s) => s.partial_data.clone().unwrap_or(Value::Null),
            TaskResult::NeedsInput(n) => json!({"message": n.message, "field": n.field}),
            TaskResult::Failed(f) => json!({"error": f.error}),
        };
        let metadata = WebhookMetadata {
            operation_id: operation_id.to_string(),
            agent_id: self.config.id.clone(),
            task_type: tool.to_string(),
            status: result.status(),
            sequence_number: None,
            notification_type: None,
            timestamp: now_rfc3339(),
        };
        if self.options.handlers.dispatch(&data, &metadata) {
            self.emit_handler_called(&metadata);
        }
    }

    fn emit_handler_called(&self, metadata: &WebhookMetadata) {
        self.emit(
            Activity::new(
                ActivityType::HandlerCalled,
                &metadata.operation_id,
                &self.config.id,
                &metadata.task_type,
            )
            .with_status(metadata.status),
        );
    }

    fn emit(&self, activity: Activity) {
        emit(self.options.on_activity.as_ref(), activity);
    }
}
