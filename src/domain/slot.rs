//! Slot requests and batches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::SlotId;

/// Adapter-specific placement identifiers for one slot.
///
/// Only `placement_key` is read by the engine; anything else rides along
/// untouched for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRef {
    pub placement_key: String,
    #[serde(flatten, default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlacementRef {
    #[must_use]
    pub fn new(placement_key: impl Into<String>) -> Self {
        Self {
            placement_key: placement_key.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// One item to bid on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub slot_id: SlotId,
    /// Page-side slot this request was generated for. Groups observability
    /// events; defaults to the slot id.
    pub ht_slot_name: String,
    pub placement: PlacementRef,
}

impl SlotRequest {
    pub fn new(slot_id: impl Into<SlotId>, placement: PlacementRef) -> Self {
        let slot_id = slot_id.into();
        Self {
            ht_slot_name: slot_id.as_str().to_string(),
            slot_id,
            placement,
        }
    }

    /// Attach the page-side slot name.
    #[must_use]
    pub fn with_ht_slot(mut self, name: impl Into<String>) -> Self {
        self.ht_slot_name = name.into();
        self
    }
}

/// Ordered group of slot requests sent as one outbound request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    slots: Vec<SlotRequest>,
}

impl Batch {
    #[must_use]
    pub fn new(slots: Vec<SlotRequest>) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn slots(&self) -> &[SlotRequest] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlotRequest> {
        self.slots.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// First slot id that appears more than once, if any.
    #[must_use]
    pub fn first_duplicate(&self) -> Option<&SlotId> {
        let mut seen = HashSet::with_capacity(self.slots.len());
        self.slots
            .iter()
            .map(|s| &s.slot_id)
            .find(|id| !seen.insert(*id))
    }

    /// Slot ids grouped by page-side slot, in first-seen order.
    #[must_use]
    pub fn ht_slot_groups(&self) -> Vec<(String, Vec<SlotId>)> {
        let mut groups: Vec<(String, Vec<SlotId>)> = Vec::new();
        for slot in &self.slots {
            match groups.iter_mut().find(|(name, _)| *name == slot.ht_slot_name) {
                Some((_, ids)) => ids.push(slot.slot_id.clone()),
                None => groups.push((slot.ht_slot_name.clone(), vec![slot.slot_id.clone()])),
            }
        }
        groups
    }
}

impl FromIterator<SlotRequest> for Batch {
    fn from_iter<I: IntoIterator<Item = SlotRequest>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a SlotRequest;
    type IntoIter = std::slice::Iter<'a, SlotRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
