//! reqwest-backed delivery channel.
//!
//! Each request runs in its own spawned task. The task is the execution
//! scope: releasing the scope aborts it, so nothing outlives the operation.

use std::time::Duration;

use reqwest::Client as HttpClient;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::payload::extract_payload;
use super::settings::HttpConfig;
use crate::domain::OutboundRequest;
use crate::error::TransportError;
use crate::port::{DeliveryChannel, DeliveryHandle, ExecutionScope};

/// Delivery channel that fetches the callback script over HTTP and hands
/// its JSON argument to the waiting operation.
#[derive(Clone)]
pub struct HttpDeliveryChannel {
    http: HttpClient,
}

impl HttpDeliveryChannel {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn from_config(config: &HttpConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self { http }
    }
}

/// Spawned request task.
struct TaskScope(AbortHandle);

impl ExecutionScope for TaskScope {
    fn release(self: Box<Self>) {
        self.0.abort();
    }
}

async fn fetch(http: HttpClient, request: OutboundRequest, delivery: DeliveryHandle) {
    let id = request.correlation_id.clone();

    let body = match http.get(request.url).send().await {
        Ok(response) => match response.error_for_status() {
            Ok(response) => response.text().await,
            Err(err) => Err(err),
        },
        Err(err) => Err(err),
    };

    let body = match body {
        Ok(body) => body,
        Err(err) => {
            debug!(correlation_id = %id, error = %err, "HTTP request failed");
            delivery.fail(TransportError::Network(err.to_string()));
            return;
        }
    };

    match extract_payload(&body) {
        Ok(payload) => {
            if !delivery.deliver(payload) {
                debug!(correlation_id = %id, "Delivery arrived after settlement");
            }
        }
        Err(err) => {
            debug!(correlation_id = %id, error = %err, "Unusable response body");
            delivery.fail(err);
        }
    }
}

impl DeliveryChannel for HttpDeliveryChannel {
    fn open(
        &self,
        request: &OutboundRequest,
        delivery: DeliveryHandle,
    ) -> Result<Box<dyn ExecutionScope>, TransportError> {
        let runtime = Handle::try_current()
            .map_err(|e| TransportError::ScopeUnavailable(e.to_string()))?;

        let task = runtime.spawn(fetch(self.http.clone(), request.clone(), delivery));
        Ok(Box::new(TaskScope(task.abort_handle())))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
