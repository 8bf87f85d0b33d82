//! Legacy SSE transport.
//!
//! The client opens `GET <url>` as an event stream. The server's first
//! `endpoint` event names the URL that JSON-RPC messages are POSTed to;
//! responses come back as `message` events on the stream and are matched to
//! waiting callers by request id.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};

use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use url::Url;

use super::{McpTransport, TransportOptions};
use crate::error::{McpError, McpResult};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestId};

type EventStream =
    Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<reqwest::Error>>> + Send>>;

type Pending = Arc<Mutex<HashMap<RequestId, oneshot::Sender<JsonRpcResponse>>>>;

/// SSE transport with a background reader task.
///
/// The reader is aborted on [`close`](McpTransport::close) or when the
/// transport is dropped.
pub struct SseTransport {
    http: Client,
    endpoint: String,
    options: TransportOptions,
    pending: Pending,
    stream_closed: Arc<AtomicBool>,
    reader: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SseTransport {
    /// Open the event stream and wait for the `endpoint` event.
    pub async fn connect(http: Client, url: &str, options: TransportOptions) -> McpResult<Self> {
        let base = Url::parse(url)?;
        let timeout = options.timeout;

        let request = options
            .apply(http.get(url))
            .header(ACCEPT, "text/event-stream");
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| McpError::Timeout(timeout))??;

        let status = response.status();
        if !status.is_success() {
            return Err(McpError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body: response.text().await.ok(),
            });
        }

        let mut events: EventStream = Box::pin(response.bytes_stream().eventsource());
        let target = tokio::time::timeout(timeout, async {
            while let Some(event) = events.next().await {
                let event = event.map_err(stream_error)?;
                if let Some(target) = endpoint_target(&event) {
                    return Ok(target);
                }
            }
            Err(McpError::Stream(
                "event stream ended before the endpoint event".into(),
            ))
        })
        .await
        .map_err(|_| McpError::Timeout(timeout))??;

        let endpoint = base.join(&target)?.to_string();
        tracing::debug!(url = %url, endpoint = %endpoint, "SSE endpoint announced");
        Ok(Self::with_events(http, endpoint, options, events))
    }

    /// Start reading responses from an already-announced event stream.
    fn with_events(
        http: Client,
        endpoint: String,
        options: TransportOptions,
        events: EventStream,
    ) -> Self {
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let stream_closed = Arc::new(AtomicBool::new(false));
        let reader = tokio::spawn(read_events(
            events,
            pending.clone(),
            stream_closed.clone(),
        ));

        Self {
            http,
            endpoint,
            options,
            pending,
            stream_closed,
            reader: std::sync::Mutex::new(Some(reader)),
        }
    }

    fn abort_reader(&self) {
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reader) = reader {
            reader.abort();
        }
    }

    async fn post(&self, message: &JsonRpcRequest) -> McpResult<()> {
        let response = self
            .options
            .apply(self.http.post(&self.endpoint))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.options.timeout)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    McpError::Timeout(self.options.timeout)
                } else {
                    McpError::Transport(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(McpError::Http {
                status: status.as_u16(),
                url: self.endpoint.clone(),
                body: response.text().await.ok(),
            })
        }
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn request(&self, request: JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        let id = request
            .id
            .clone()
            .ok_or_else(|| McpError::MalformedResponse("request has no id".into()))?;
        tracing::debug!(endpoint = %self.endpoint, method = %request.method, id = %id, "MCP request");

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);
        if self.stream_closed.load(Ordering::SeqCst) {
            self.pending.lock().await.remove(&id);
            return Err(McpError::Closed);
        }

        if let Err(e) = self.post(&request).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.options.timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(McpError::Stream(
                "event stream closed before the response arrived".into(),
            )),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(McpError::Timeout(self.options.timeout))
            }
        }
    }

    async fn notify(&self, notification: JsonRpcRequest) -> McpResult<()> {
        tracing::debug!(endpoint = %self.endpoint, method = %notification.method, "MCP notification");
        self.post(&notification).await
    }

    async fn close(&self) -> McpResult<()> {
        self.abort_reader();
        self.stream_closed.store(true, Ordering::SeqCst);
        self.pending.lock().await.clear();
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.abort_reader();
    }
}

/// Route `message` events to the callers waiting on their ids.
async fn read_events(mut events: EventStream, pending: Pending, closed: Arc<AtomicBool>) {
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "SSE stream failed");
                break;
            }
        };
        if !(event.event.is_empty() || event.event == "message") {
            continue;
        }
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&event.data) else {
            tracing::warn!(data = %event.data, "Skipping unparseable SSE message");
            continue;
        };
        let Some(reply) = JsonRpcResponse::from_message(&value) else {
            continue;
        };
        let Some(id) = reply.id.clone() else {
            continue;
        };
        if let Some(waiter) = pending.lock().await.remove(&id) {
            let _ = waiter.send(reply);
        }
    }
    closed.store(true, Ordering::SeqCst);
    // Dropping the senders wakes every remaining waiter with an error.
    pending.lock().await.clear();
    tracing::debug!("SSE stream ended");
}

/// The POST target announced by an `endpoint` event.
fn endpoint_target(event: &Event) -> Option<String> {
    if event.event.trim() != "endpoint" {
        return None;
    }
    let target = event.data.trim();
    (!target.is_empty()).then(|| target.to_string())
}

fn stream_error(e: EventStreamError<reqwest::Error>) -> McpError {
    match e {
        EventStreamError::Transport(inner) => McpError::Transport(inner),
        other => McpError::Stream(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, data: &str) -> Event {
        Event {
            event: name.into(),
            data: data.into(),
            id: String::new(),
            retry: None,
        }
    }

    #[test]
    fn test_endpoint_target() {
        assert_eq!(
            endpoint_target(&event("endpoint", " /messages?session_id=abc \n")).as_deref(),
            Some("/messages?session_id=abc")
        );
        assert!(endpoint_target(&event("message", "/messages")).is_none());
        assert!(endpoint_target(&event("endpoint", "  ")).is_none());
    }

    #[test]
    fn test_endpoint_resolution() {
        let base = Url::parse("https://agent.example.com/mcp/sse").unwrap();
        assert_eq!(
            base.join("/messages?session_id=abc").unwrap().as_str(),
            "https://agent.example.com/messages?session_id=abc"
        );
        assert_eq!(
            base.join("https://other.example.com/post").unwrap().as_str(),
            "https://other.example.com/post"
        );
    }

    /// An event stream that stays open and never yields.
    fn silent_stream() -> EventStream {
        Box::pin(futures::stream::pending::<
            Result<Event, EventStreamError<reqwest::Error>>,
        >())
    }

    #[tokio::test]
    async fn test_drop_stops_reader() {
        let transport = SseTransport::with_events(
            Client::new(),
            "https://agent.example.com/messages".into(),
            TransportOptions::default(),
            silent_stream(),
        );
        let pending = transport.pending.clone();
        tokio::task::yield_now().await;
        assert_eq!(Arc::strong_count(&pending), 3);

        drop(transport);
        for _ in 0..100 {
            if Arc::strong_count(&pending) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&pending), 1);
    }

    #[tokio::test]
    async fn test_close_stops_reader() {
        let transport = SseTransport::with_events(
            Client::new(),
            "https://agent.example.com/messages".into(),
            TransportOptions::default(),
            silent_stream(),
        );
        transport.close().await.unwrap();
        assert!(transport.reader.lock().unwrap().is_none());
        assert!(transport.stream_closed.load(Ordering::SeqCst));
        assert!(matches!(
            transport.request(JsonRpcRequest::new(RequestId::Number(1), "tools/list", None)).await,
            Err(McpError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_connect_fails_on_http_error() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = SseTransport::connect(Client::new(), &server.uri(), TransportOptions::default())
            .await
            .err()
            .unwrap();
        assert!(err.is_unauthorized());
    }
}
