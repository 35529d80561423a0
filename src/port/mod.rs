//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     caller ───────►│  DemandPartner (inbound)│
//!                    │                         │
//!                    │  Application + Domain   │
//!                    └────────────┬────────────┘
//!                                 │
//!          ┌──────────────────────┼──────────────────────┐
//!          ▼                      ▼                      ▼
//!   ┌─────────────┐        ┌─────────────┐        ┌─────────────┐
//!   │  Delivery   │        │     Id      │        │  Notifier   │
//!   │  Channel    │        │  Generator  │        │  Adapter    │
//!   └─────────────┘        └─────────────┘        └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`inbound::DemandPartner`] - Batch retrieval entry point
//! - [`outbound::channel::DeliveryChannel`] - Out-of-band request/response channel
//! - [`outbound::id::IdGenerator`] - Correlation id minting
//! - [`outbound::notifier::Notifier`] - Observability events

pub mod inbound;
pub mod outbound;

pub use inbound::DemandPartner;
pub use outbound::channel::{DeliveryChannel, DeliveryHandle, ExecutionScope};
pub use outbound::id::IdGenerator;
pub use outbound::notifier::{
    Event, InternalErrorEvent, LogNotifier, Notifier, NotifierRegistry, NullNotifier,
    RequestCompleteEvent, RequestStatus, SlotGroupEvent,
};
