//! Notifier that keeps every event for later assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::{Event, Notifier};

/// Records events. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
