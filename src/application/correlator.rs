//! Callback correlation registry.
//!
//! Out-of-band responses arrive addressed only by a correlation id. The
//! correlator maps each pending id to the settlement callback of the
//! operation that issued it and guarantees at-most-once settlement: the first
//! `invoke` or `cancel` removes the entry, anything after that is a no-op.
//!
//! One instance is shared process-wide (see [`CallbackCorrelator::global`])
//! since every channel addresses callbacks through the same flat id space.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::domain::{CorrelationId, RawResponse};
use crate::error::CorrelatorError;

type SettleFn = Box<dyn FnOnce(RawResponse) + Send + Sync>;

/// One in-flight operation awaiting its out-of-band response.
pub struct PendingOperation {
    id: CorrelationId,
    created_at: DateTime<Utc>,
    registered: Instant,
    settle: SettleFn,
}

impl PendingOperation {
    #[must_use]
    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn age(&self) -> Duration {
        self.registered.elapsed()
    }
}

impl fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Registry of pending operations keyed by correlation id.
#[derive(Default)]
pub struct CallbackCorrelator {
    pending: DashMap<CorrelationId, PendingOperation>,
}

static GLOBAL: OnceLock<Arc<CallbackCorrelator>> = OnceLock::new();

impl CallbackCorrelator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide correlator.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Store `on_settle` under `id`. Must happen before the request is sent.
    pub fn register(
        &self,
        id: CorrelationId,
        on_settle: impl FnOnce(RawResponse) + Send + Sync + 'static,
    ) -> Result<(), CorrelatorError> {
        match self.pending.entry(id.clone()) {
            Entry::Occupied(_) => {
                warn!(correlation_id = %id, "Correlation id already pending");
                Err(CorrelatorError::AlreadyPending(id.to_string()))
            }
            Entry::Vacant(slot) => {
                debug!(correlation_id = %id, "Registered pending operation");
                slot.insert(PendingOperation {
                    id,
                    created_at: Utc::now(),
                    registered: Instant::now(),
                    settle: Box::new(on_settle),
                });
                Ok(())
            }
        }
    }

    /// Register `id` and receive its payload through a oneshot channel.
    ///
    /// The receiver errors if the entry is cancelled before delivery.
    pub fn register_channel(
        &self,
        id: CorrelationId,
    ) -> Result<oneshot::Receiver<RawResponse>, CorrelatorError> {
        let (tx, rx) = oneshot::channel();
        self.register(id, move |payload| {
            // receiver gone means the waiter already gave up
            let _ = tx.send(payload);
        })?;
        Ok(rx)
    }

    /// Settle `id` with `payload`.
    ///
    /// The entry is removed before the callback runs. Unknown or already
    /// settled ids are ignored and return `false`.
    pub fn invoke(&self, id: &CorrelationId, payload: RawResponse) -> bool {
        match self.pending.remove(id) {
            Some((_, operation)) => {
                debug!(
                    correlation_id = %id,
                    age_ms = operation.age().as_millis() as u64,
                    "Settling pending operation"
                );
                (operation.settle)(payload);
                true
            }
            None => {
                debug!(correlation_id = %id, "Ignoring delivery for unknown or settled id");
                false
            }
        }
    }

    /// Drop `id` without settling it. Returns `false` if it was not pending.
    pub fn cancel(&self, id: &CorrelationId) -> bool {
        let removed = self.pending.remove(id).is_some();
        if removed {
            debug!(correlation_id = %id, "Cancelled pending operation");
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.pending.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove entries older than `max_age` without settling them.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_older_than(&self, max_age: Duration) -> usize {
        let mut removed = 0;
        self.pending.retain(|id, operation| {
            let keep = operation.age() < max_age;
            if !keep {
                warn!(correlation_id = %id, "Reaping stale pending operation");
                removed += 1;
            }
            keep
        });
        removed
    }
}

impl fmt::Debug for CallbackCorrelator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackCorrelator")
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn payload() -> RawResponse {
        RawResponse::new(json!({"slots": {}}))
    }

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnOnce(RawResponse) + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn invoke_settles_once() {
        let correlator = CallbackCorrelator::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = CorrelationId::new("_1");

        correlator.register(id.clone(), counting(&calls)).unwrap();

        assert!(correlator.invoke(&id, payload()));
        assert!(!correlator.invoke(&id, payload()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(correlator.is_empty());
    }

    #[test]
    fn invoke_after_cancel_is_noop() {
        let correlator = CallbackCorrelator::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = CorrelationId::new("_2");

        correlator.register(id.clone(), counting(&calls)).unwrap();

        assert!(correlator.cancel(&id));
        assert!(!correlator.invoke(&id, payload()));
        assert!(!correlator.cancel(&id));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invoke_unknown_id_is_noop() {
        let correlator = CallbackCorrelator::new();
        assert!(!correlator.invoke(&CorrelationId::new("_missing"), payload()));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let correlator = CallbackCorrelator::new();
        let id = CorrelationId::new("_3");

        correlator.register(id.clone(), |_| {}).unwrap();
        let err = correlator.register(id.clone(), |_| {}).unwrap_err();

        assert_eq!(err, CorrelatorError::AlreadyPending("_3".into()));
        assert_eq!(correlator.len(), 1);
    }

    #[test]
    fn entries_are_independent() {
        let correlator = CallbackCorrelator::new();
        let a_calls = Arc::new(AtomicUsize::new(0));
        let b_calls = Arc::new(AtomicUsize::new(0));
        let a = CorrelationId::new("_a");
        let b = CorrelationId::new("_b");

        correlator.register(a.clone(), counting(&a_calls)).unwrap();
        correlator.register(b.clone(), counting(&b_calls)).unwrap();

        correlator.invoke(&a, payload());

        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
        assert!(correlator.contains(&b));
    }

    #[tokio::test]
    async fn register_channel_receives_payload() {
        let correlator = CallbackCorrelator::new();
        let id = CorrelationId::new("_4");

        let rx = correlator.register_channel(id.clone()).unwrap();
        correlator.invoke(&id, payload());

        assert_eq!(rx.await.unwrap(), payload());
    }

    #[tokio::test]
    async fn register_channel_errors_on_cancel() {
        let correlator = CallbackCorrelator::new();
        let id = CorrelationId::new("_5");

        let rx = correlator.register_channel(id.clone()).unwrap();
        correlator.cancel(&id);

        assert!(rx.await.is_err());
    }

    #[test]
    fn sweep_removes_only_stale_entries() {
        let correlator = CallbackCorrelator::new();
        correlator.register(CorrelationId::new("_old"), |_| {}).unwrap();

        assert_eq!(correlator.sweep_older_than(Duration::from_secs(60)), 0);
        assert_eq!(correlator.sweep_older_than(Duration::ZERO), 1);
        assert!(correlator.is_empty());
    }

    #[test]
    fn global_is_shared() {
        let a = CallbackCorrelator::global();
        let b = CallbackCorrelator::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
