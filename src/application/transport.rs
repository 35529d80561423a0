//! Timeout-bounded transport over an out-of-band delivery channel.
//!
//! # Lifecycle
//!
//! 1. **Register**: the correlation id goes into the correlator before
//!    anything is sent, so an early delivery cannot be lost
//! 2. **Open**: the channel opens an execution scope and issues the request
//! 3. **Wait**: first of delivery, channel failure or timeout wins
//! 4. **Release**: the correlator entry is cancelled and the scope released
//!    on every exit path, including unwinding
//!
//! A delivery that arrives after step 4 finds no entry and is dropped.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::correlator::CallbackCorrelator;
use crate::domain::{CorrelationId, OutboundRequest, RawResponse};
use crate::error::TransportError;
use crate::port::{DeliveryChannel, DeliveryHandle, ExecutionScope};

/// Terminal outcome of one transport operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    Success(RawResponse),
    Timeout,
    Failure(String),
}

impl TransportOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for TransportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(_) => write!(f, "success"),
            Self::Timeout => write!(f, "timeout"),
            Self::Failure(reason) => write!(f, "failure: {reason}"),
        }
    }
}

/// Cancels the correlator entry when dropped.
struct PendingGuard<'a> {
    correlator: &'a CallbackCorrelator,
    id: &'a CorrelationId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        // no-op when the delivery already settled the entry
        self.correlator.cancel(self.id);
    }
}

/// Releases the execution scope when dropped.
struct ScopeGuard(Option<Box<dyn ExecutionScope>>);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(scope) = self.0.take() {
            scope.release();
        }
    }
}

/// Sends outbound requests through a [`DeliveryChannel`] and settles each
/// with exactly one [`TransportOutcome`].
pub struct Transport {
    channel: Arc<dyn DeliveryChannel>,
    correlator: Arc<CallbackCorrelator>,
}

impl Transport {
    pub fn new(channel: Arc<dyn DeliveryChannel>, correlator: Arc<CallbackCorrelator>) -> Self {
        Self {
            channel,
            correlator,
        }
    }

    #[must_use]
    pub fn correlator(&self) -> &Arc<CallbackCorrelator> {
        &self.correlator
    }

    /// Send `request` and wait at most `timeout` for its delivery.
    pub async fn send(&self, request: &OutboundRequest, timeout: Duration) -> TransportOutcome {
        let id = &request.correlation_id;
        let started = Instant::now();

        let mut response_rx = match self.correlator.register_channel(id.clone()) {
            Ok(rx) => rx,
            Err(err) => return TransportOutcome::Failure(err.to_string()),
        };
        let _pending = PendingGuard {
            correlator: self.correlator.as_ref(),
            id,
        };

        let (failure_tx, mut failure_rx) = oneshot::channel();
        let correlator = Arc::clone(&self.correlator);
        let deliver_id = id.clone();
        let handle = DeliveryHandle::new(
            id.clone(),
            move |payload| correlator.invoke(&deliver_id, payload),
            failure_tx,
        );

        let _scope = match self.channel.open(request, handle) {
            Ok(scope) => ScopeGuard(Some(scope)),
            Err(err) => {
                warn!(
                    channel = self.channel.name(),
                    correlation_id = %id,
                    error = %err,
                    "Failed to open delivery channel"
                );
                return TransportOutcome::Failure(err.to_string());
            }
        };

        debug!(
            channel = self.channel.name(),
            correlation_id = %id,
            timeout_ms = timeout.as_millis() as u64,
            "Request dispatched"
        );

        let outcome = tokio::select! {
            biased;

            delivered = &mut response_rx => match delivered {
                Ok(payload) => TransportOutcome::Success(payload),
                Err(_) => TransportOutcome::Failure(TransportError::ChannelClosed.to_string()),
            },
            Ok(err) = &mut failure_rx => TransportOutcome::Failure(err.to_string()),
            () = tokio::time::sleep(timeout) => TransportOutcome::Timeout,
        };

        debug!(
            correlation_id = %id,
            outcome = %outcome,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request settled"
        );

        outcome
    }
}
