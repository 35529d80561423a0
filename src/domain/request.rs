//! Outbound request descriptor.

use serde::ser::{Serialize, SerializeMap, Serializer};
use url::Url;

use super::id::{CorrelationId, SlotId};

/// Ordered `slot_id -> placement_key` mapping sent to the endpoint.
///
/// Serializes as a JSON object whose keys keep batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMaker {
    entries: Vec<(SlotId, String)>,
}

impl KeyMaker {
    pub fn insert(&mut self, slot_id: SlotId, placement_key: impl Into<String>) {
        self.entries.push((slot_id, placement_key.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotId, &str)> {
        self.entries.iter().map(|(slot, key)| (slot, key.as_str()))
    }
}

impl Serialize for KeyMaker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (slot, key) in &self.entries {
            map.serialize_entry(slot.as_str(), key)?;
        }
        map.end()
    }
}

/// Everything a delivery channel needs to issue one batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: Url,
    pub correlation_id: CorrelationId,
    pub key_maker: KeyMaker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_maker_serializes_in_insertion_order() {
        let mut km = KeyMaker::default();
        km.insert(SlotId::new("zeta"), "k1");
        km.insert(SlotId::new("alpha"), "k2");

        let json = serde_json::to_string(&km).unwrap();
        assert_eq!(json, r#"{"zeta":"k1","alpha":"k2"}"#);
    }
}
