//! Scripted [`DeliveryChannel`] for driving the transport without a network.
//!
//! Each `open` plays the same [`Script`]. Counters record how often scopes
//! were opened and released and how many deliveries the correlator refused,
//! so tests can assert on cleanup as well as outcomes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::{OutboundRequest, RawResponse};
use crate::error::TransportError;
use crate::port::{DeliveryChannel, DeliveryHandle, ExecutionScope};

/// What the channel does with each request.
#[derive(Debug, Clone)]
pub enum Script {
    /// Deliver the payload synchronously inside `open`.
    Deliver(Value),
    /// Deliver the payload twice in a row.
    DeliverTwice(Value),
    /// Deliver the payload from a spawned task after a delay.
    DeliverAfter(Duration, Value),
    /// Report a channel failure synchronously.
    Fail(TransportError),
    /// Never deliver.
    Silent,
    /// Refuse to open a scope.
    RefuseOpen,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    released: AtomicUsize,
    rejected: AtomicUsize,
}

impl Counters {
    fn track(&self, accepted: bool) {
        if !accepted {
            self.rejected.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A channel that plays a fixed script and counts what happened.
pub struct ScriptedChannel {
    script: Script,
    counters: Arc<Counters>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedChannel {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            counters: Arc::new(Counters::default()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Scopes opened so far.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Scopes released so far.
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Deliveries the correlator turned away (late or duplicate).
    pub fn rejected_deliveries(&self) -> usize {
        self.counters.rejected.load(Ordering::SeqCst)
    }

    /// Every request passed to `open`, including refused ones.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }
}

struct ScriptedScope {
    counters: Arc<Counters>,
}

impl ExecutionScope for ScriptedScope {
    fn release(self: Box<Self>) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl DeliveryChannel for ScriptedChannel {
    fn open(
        &self,
        request: &OutboundRequest,
        delivery: DeliveryHandle,
    ) -> Result<Box<dyn ExecutionScope>, TransportError> {
        self.requests.lock().push(request.clone());

        if matches!(self.script, Script::RefuseOpen) {
            return Err(TransportError::ScopeUnavailable("scripted refusal".into()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            Script::Deliver(body) => {
                let accepted = delivery.deliver(RawResponse::new(body.clone()));
                self.counters.track(accepted);
            }
            Script::DeliverTwice(body) => {
                for _ in 0..2 {
                    let accepted = delivery.deliver(RawResponse::new(body.clone()));
                    self.counters.track(accepted);
                }
            }
            Script::DeliverAfter(delay, body) => {
                let delay = *delay;
                let body = body.clone();
                let counters = Arc::clone(&self.counters);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let accepted = delivery.deliver(RawResponse::new(body));
                    counters.track(accepted);
                });
            }
            Script::Fail(error) => {
                delivery.fail(error.clone());
            }
            Script::Silent | Script::RefuseOpen => {}
        }

        Ok(Box::new(ScriptedScope {
            counters: Arc::clone(&self.counters),
        }))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
