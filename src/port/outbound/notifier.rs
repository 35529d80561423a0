//! Notifier port for observability events.
//!
//! This module defines the trait for reporting the request lifecycle of a
//! batch: request sent, bids and passes found, timeouts, errors and
//! completion.

use std::fmt;

use crate::domain::{CorrelationId, SessionId, SlotId};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// Outbound request issued for a group of slots.
    RequestSent(SlotGroupEvent),
    /// A slot received a usable bid.
    BidFound(SlotGroupEvent),
    /// Slots that received no usable bid.
    Pass(SlotGroupEvent),
    /// Request timed out before the response arrived.
    Timeout(SlotGroupEvent),
    /// Channel-level failure for a group of slots.
    Error(SlotGroupEvent),
    /// Request finished, one per batch.
    RequestComplete(RequestCompleteEvent),
    /// Something went wrong while handling the response.
    InternalError(InternalErrorEvent),
}

/// Event about the slots of one page-side slot within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGroupEvent {
    pub session_id: SessionId,
    pub partner_id: String,
    pub ht_slot_name: String,
    pub slot_ids: Vec<SlotId>,
}

/// Terminal status of a batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Timeout,
    Error,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Request completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCompleteEvent {
    pub session_id: SessionId,
    pub partner_id: String,
    pub correlation_id: CorrelationId,
    pub status: RequestStatus,
    /// Number of slots in the batch.
    pub slots: usize,
}

/// Internal error event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalErrorEvent {
    pub partner_id: String,
    pub message: String,
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget and sit on the retrieval path, so
/// `notify` must return quickly and must not fail. Slow sinks should spawn.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{debug, info, warn};
        match event {
            Event::RequestSent(e) => {
                debug!(
                    session = %e.session_id,
                    partner = %e.partner_id,
                    ht_slot = %e.ht_slot_name,
                    slots = ?e.slot_ids,
                    "Bidder request sent"
                );
            }
            Event::BidFound(e) => {
                info!(
                    session = %e.session_id,
                    partner = %e.partner_id,
                    ht_slot = %e.ht_slot_name,
                    slots = ?e.slot_ids,
                    "Bid found"
                );
            }
            Event::Pass(e) => {
                debug!(
                    session = %e.session_id,
                    partner = %e.partner_id,
                    ht_slot = %e.ht_slot_name,
                    slots = ?e.slot_ids,
                    "Pass"
                );
            }
            Event::Timeout(e) => {
                warn!(
                    session = %e.session_id,
                    partner = %e.partner_id,
                    ht_slot = %e.ht_slot_name,
                    slots = ?e.slot_ids,
                    "Bidder timed out"
                );
            }
            Event::Error(e) => {
                warn!(
                    session = %e.session_id,
                    partner = %e.partner_id,
                    ht_slot = %e.ht_slot_name,
                    slots = ?e.slot_ids,
                    "Bidder error"
                );
            }
            Event::RequestComplete(e) => {
                info!(
                    session = %e.session_id,
                    partner = %e.partner_id,
                    correlation_id = %e.correlation_id,
                    status = %e.status,
                    slots = e.slots,
                    "Request complete"
                );
            }
            Event::InternalError(e) => {
                warn!(partner = %e.partner_id, message = %e.message, "Internal error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl Notifier for Counting {
        fn notify(&self, _event: Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn registry_broadcasts_to_every_notifier() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(Counting(count.clone())));
        registry.register(Box::new(Counting(count.clone())));
        registry.register(Box::new(NullNotifier));

        registry.notify_all(Event::InternalError(InternalErrorEvent {
            partner_id: "p".into(),
            message: "boom".into(),
        }));

        assert_eq!(registry.len(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn request_status_display() {
        assert_eq!(RequestStatus::Timeout.to_string(), "timeout");
    }
}
