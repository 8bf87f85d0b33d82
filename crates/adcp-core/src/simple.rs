//! Ergonomic accessor: JSON parameters in, response data out.
//!
//! Every non-completed outcome becomes a [`SimpleApiError`], so callers can
//! use `?` straight through a script-style workflow.

use serde_json::Value;
use thiserror::Error;

use crate::client::AdcpClient;
use crate::error::AdcpError;
use crate::result::TaskResult;
use crate::types::*;

#[derive(Debug, Error)]
pub enum SimpleApiError {
    #[error("Task submitted for async processing; result will be delivered to webhook {}", .webhook_url.as_deref().unwrap_or("(none configured)"))]
    Submitted {
        webhook_url: Option<String>,
        operation_id: Option<String>,
    },

    #[error("Agent needs input: {0}")]
    NeedsInput(String),

    #[error("Task failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Adcp(#[from] AdcpError),
}

pub type SimpleResult<T> = Result<T, SimpleApiError>;

/// Unwrap a task result into its data.
pub fn into_data<T>(result: TaskResult<T>) -> SimpleResult<T> {
    match result {
        TaskResult::Completed(completed) => Ok(completed.data),
        TaskResult::Submitted(submitted) => Err(SimpleApiError::Submitted {
            webhook_url: submitted.webhook_url,
            operation_id: submitted.operation_id,
        }),
        TaskResult::NeedsInput(needs) => Err(SimpleApiError::NeedsInput(needs.message)),
        TaskResult::Failed(failed) => Err(SimpleApiError::Failed(failed.error)),
    }
}

/// Borrowed from an [`AdcpClient`] via [`AdcpClient::simple`].
#[derive(Debug, Clone, Copy)]
pub struct SimpleApi<'a> {
    client: &'a AdcpClient,
}

macro_rules! simple_operations {
    ($($method:ident => $request:ty;)*) => {
        $(
            pub async fn $method(
                &self,
                params: Value,
            ) -> SimpleResult<<$request as AdcpRequest>::Response> {
                self.run::<$request>(params).await
            }
        )*
    };
}

impl<'a> SimpleApi<'a> {
    pub(crate) fn new(client: &'a AdcpClient) -> Self {
        Self { client }
    }

    async fn run<R: AdcpRequest>(&self, params: Value) -> SimpleResult<R::Response> {
        let request: R = serde_json::from_value(params).map_err(|e| AdcpError::InvalidParams {
            operation: R::TOOL_NAME.to_string(),
            message: e.to_string(),
        })?;
        into_data(self.client.execute(&request).await)
    }

    simple_operations! {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{NeedsInput, Submitted};

    #[test]
    fn test_into_data_maps_every_state() {
        assert_eq!(into_data(TaskResult::completed(7)).unwrap(), 7);

        let err = into_data::<i32>(TaskResult::Submitted(Submitted {
            webhook_url: Some("https://buyer.example.com/hook".into()),
            operation_id: Some("op_1".into()),
            ..Submitted::default()
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Task submitted for async processing; result will be delivered to webhook https://buyer.example.com/hook"
        );

        let err = into_data::<i32>(TaskResult::NeedsInput(NeedsInput {
            message: "Which market?".into(),
            field: None,
            debug_info: None,
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Agent needs input: Which market?");

        let err = into_data::<i32>(TaskResult::failed("budget too low")).unwrap_err();
        assert_eq!(err.to_string(), "Task failed: budget too low");
    }
}
