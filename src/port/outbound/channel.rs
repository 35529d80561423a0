//! Out-of-band delivery channel port.
//!
//! A channel issues one request inside an isolated [`ExecutionScope`] and
//! later hands the structured response (never code) to the
//! [`DeliveryHandle`] it was opened with. Channel-level errors are reported
//! through the same handle.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::domain::{CorrelationId, OutboundRequest, RawResponse};
use crate::error::TransportError;

type DeliverFn = Box<dyn Fn(RawResponse) -> bool + Send + Sync>;

/// Where a channel reports the outcome of one request.
///
/// `deliver` may be called any number of times; only the first call while
/// the operation is still pending has any effect.
pub struct DeliveryHandle {
    correlation_id: CorrelationId,
    deliver: DeliverFn,
    failure: Mutex<Option<oneshot::Sender<TransportError>>>,
}

impl DeliveryHandle {
    pub fn new(
        correlation_id: CorrelationId,
        deliver: impl Fn(RawResponse) -> bool + Send + Sync + 'static,
        failure: oneshot::Sender<TransportError>,
    ) -> Self {
        Self {
            correlation_id,
            deliver: Box::new(deliver),
            failure: Mutex::new(Some(failure)),
        }
    }

    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Hand a structured payload to the waiting operation.
    ///
    /// Returns `false` when the operation was already settled or cancelled.
    pub fn deliver(&self, payload: RawResponse) -> bool {
        (self.deliver)(payload)
    }

    /// Report a channel-level failure. Only the first report is kept.
    pub fn fail(&self, error: TransportError) -> bool {
        match self.failure.lock().take() {
            Some(tx) => tx.send(error).is_ok(),
            None => false,
        }
    }
}

impl std::fmt::Debug for DeliveryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryHandle")
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

/// Isolated context a single request runs in.
///
/// Released exactly once by the transport, whatever the outcome.
pub trait ExecutionScope: Send {
    fn release(self: Box<Self>);
}

/// Out-of-band request channel.
pub trait DeliveryChannel: Send + Sync {
    /// Open a scope for `request` and issue it. The response, or a failure,
    /// must later be reported through `delivery`.
    fn open(
        &self,
        request: &OutboundRequest,
        delivery: DeliveryHandle,
    ) -> Result<Box<dyn ExecutionScope>, TransportError>;

    /// Channel name for logging.
    fn name(&self) -> &'static str;
}
