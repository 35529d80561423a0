//! Outbound ports: collaborators the engine calls out to.

pub mod channel;
pub mod id;
pub mod notifier;
