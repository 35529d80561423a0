//! Builders for domain primitives used across tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

use crate::domain::{Batch, PlacementRef, SlotRequest};
use crate::port::IdGenerator;

/// Deterministic ids: `{prefix}-1`, `{prefix}-2`, ...
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{n}", self.prefix)
    }
}

/// A slot whose placement key is `key-{id}`.
pub fn slot(id: &str) -> SlotRequest {
    SlotRequest::new(id, PlacementRef::new(format!("key-{id}")))
}

/// A batch of [`slot`]s in the given order.
pub fn batch(ids: &[&str]) -> Batch {
    ids.iter().map(|id| slot(id)).collect()
}

/// A bid entry as the endpoint returns it.
pub fn bid_entry(width: u32, height: u32, price: Value, aid: &str) -> Value {
    json!({
        "sbi_size": [width, height],
        "sbi_mouse": price,
        "sbi_aid": aid,
    })
}

/// A response body holding `entries` under `slots`.
pub fn response(entries: &[(&str, Value)]) -> Value {
    let slots: serde_json::Map<String, Value> = entries
        .iter()
        .map(|(id, entry)| ((*id).to_string(), entry.clone()))
        .collect();
    json!({ "slots": slots })
}
