//! Unique id generation port.

/// Source of correlation ids.
///
/// Ids must be unique among operations that are in flight at the same time.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}
