//! Raw response payload delivered by the out-of-band channel.

use serde_json::{Map, Value};

/// Key of the per-slot bid map inside a response.
pub const SLOTS_FIELD: &str = "slots";

/// Untyped payload exactly as delivered.
///
/// The expected shape is `{ "slots": { <slot_id>: <bid fields> }, ... }`
/// where everything outside `slots` is page-level.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse(Value);

impl RawResponse {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The per-slot bid map, if the payload carries one.
    #[must_use]
    pub fn slots(&self) -> Option<&Map<String, Value>> {
        self.0.get(SLOTS_FIELD).and_then(Value::as_object)
    }

    /// A page-level field, if present.
    #[must_use]
    pub fn page_field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
