//! Typed request and response shapes for the AdCP operations.
//!
//! Each request type implements [`AdcpRequest`], which ties it to the tool
//! name it is sent under and the response shape it expects. Requests reject
//! unknown fields so loosely-built requests fail fast; responses keep
//! unknown fields in a flattened `extra` map so nothing is lost when they
//! are re-serialized.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod common;
pub mod creative;
pub mod media_buy;
pub mod products;
pub mod signals;

pub use common::*;
pub use creative::*;
pub use media_buy::*;
pub use products::*;
pub use signals::*;

/// A request for one AdCP operation.
pub trait AdcpRequest: Serialize + DeserializeOwned + Send + Sync {
    /// Tool name the operation is invoked under.
    const TOOL_NAME: &'static str;

    /// Shape of the completed response.
    type Response: Serialize + DeserializeOwned + Send + 'static;
}

/// JSON Schema of a request type.
pub fn request_schema<R: AdcpRequest + JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(R)).unwrap_or(Value::Null)
}

/// The error shape shared by every union-typed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

macro_rules! impl_request {
    ($($request:ty => $response:ty, $tool:literal;)+) => {
        $(
            impl $crate::types::AdcpRequest for $request {
                const TOOL_NAME: &'static str = $tool;
                type Response = $response;
            }
        )+
    };
}

/// Declare a response that is either `$success` or [`ErrorResponse`],
/// told apart by which shape the payload satisfies. A payload satisfying
/// both or neither is rejected.
macro_rules! response_union {
    ($(#[$meta:meta])* $name:ident, $success:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            Success($success),
            Error($crate::types::ErrorResponse),
        }

        impl $name {
            pub fn is_success(&self) -> bool {
                matches!(self, $name::Success(_))
            }

            pub fn success(&self) -> Option<&$success> {
                match self {
                    $name::Success(s) => Some(s),
                    $name::Error(_) => None,
                }
            }

            pub fn errors(&self) -> &[$crate::types::ErrorDetail] {
                match self {
                    $name::Success(_) => &[],
                    $name::Error(e) => &e.errors,
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $name::Success(s) => s.serialize(serializer),
                    $name::Error(e) => e.serialize(serializer),
                }
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                use ::serde::de::Error;
                let value = ::serde_json::Value::deserialize(deserializer)?;
                let success = ::serde_json::from_value::<$success>(value.clone());
                let error = ::serde_json::from_value::<$crate::types::ErrorResponse>(value);
                match (success, error) {
                    (Ok(s), Err(_)) => Ok($name::Success(s)),
                    (Err(_), Ok(e)) => Ok($name::Error(e)),
                    (Ok(_), Ok(_)) => Err(D::Error::custom(concat!(
                        stringify!($name),
                        " matches both the success and the error shape"
                    ))),
                    (Err(s), Err(e)) => Err(D::Error::custom(format!(
                        concat!(
                            stringify!($name),
                            " matches neither shape (success: {}; error: {})"
                        ),
                        s, e
                    ))),
                }
            }
        }
    };
}

pub(crate) use response_union;

impl_request! {
    GetProductsRequest => GetProductsResponse, "get_products";
    ListCreativeFormatsRequest => ListCreativeFormatsResponse, "list_creative_formats";
    ListAuthorizedPropertiesRequest => ListAuthorizedPropertiesResponse, "list_authorized_properties";
    SyncCreativesRequest => SyncCreativesResponse, "sync_creatives";
    ListCreativesRequest => ListCreativesResponse, "list_creatives";
    PreviewCreativeRequest => PreviewCreativeResponse, "preview_creative";
    BuildCreativeRequest => BuildCreativeResponse, "build_creative";
    CreateMediaBuyRequest => CreateMediaBuyResponse, "create_media_buy";
    UpdateMediaBuyRequest => UpdateMediaBuyResponse, "update_media_buy";
    GetMediaBuyDeliveryRequest => GetMediaBuyDeliveryResponse, "get_media_buy_delivery";
    ProvidePerformanceFeedbackRequest => ProvidePerformanceFeedbackResponse, "provide_performance_feedback";
    GetSignalsRequest => GetSignalsResponse, "get_signals";
    ActivateSignalRequest => ActivateSignalResponse, "activate_signal";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_union_prefers_structural_match() {
        let ok: CreateMediaBuyResponse = serde_json::from_value(json!({
            "media_buy_id": "mb_123",
            "buyer_ref": "ref_456",
            "packages": []
        }))
        .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.success().unwrap().media_buy_id, "mb_123");

        let err: CreateMediaBuyResponse = serde_json::from_value(json!({
            "errors": [{"code": "invalid_budget", "message": "Budget too low"}]
        }))
        .unwrap();
        assert!(!err.is_success());
        assert_eq!(err.errors()[0].code, "invalid_budget");
    }

    #[test]
    fn test_union_rejects_both_and_neither() {
        let both = serde_json::from_value::<CreateMediaBuyResponse>(json!({
            "media_buy_id": "mb_123",
            "buyer_ref": "ref_456",
            "errors": [{"code": "x", "message": "y"}]
        }));
        assert!(both.unwrap_err().to_string().contains("both"));

        let neither = serde_json::from_value::<ActivateSignalResponse>(json!({"status": "ok"}));
        assert!(neither.unwrap_err().to_string().contains("neither"));
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(GetProductsRequest::TOOL_NAME, "get_products");
        assert_eq!(ProvidePerformanceFeedbackRequest::TOOL_NAME, "provide_performance_feedback");
        assert_eq!(ActivateSignalRequest::TOOL_NAME, "activate_signal");
    }

    #[test]
    fn test_request_schema_lists_properties() {
        let schema = request_schema::<GetProductsRequest>();
        assert!(schema["properties"].get("brief").is_some());
    }

    #[test]
    fn test_responses_keep_unknown_fields() {
        let wire = json!({
            "products": [{
                "product_id": "p1",
                "name": "Homepage takeover",
                "description": "Full-page unit",
                "delivery_type": "guaranteed",
                "x_vendor": {"tier": 1}
            }],
            "x_trace": "abc"
        });
        let typed: GetProductsResponse = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(typed.products[0].extra["x_vendor"], json!({"tier": 1}));
        assert_eq!(serde_json::to_value(&typed).unwrap(), wire);
    }
}
