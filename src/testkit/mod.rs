//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`channel`]: scripted [`DeliveryChannel`](crate::port::DeliveryChannel)
//!   with open/release/rejection counters.
//! - [`domain`]: builders for slots, batches and responses, plus a
//!   deterministic id generator.
//! - [`notifier`]: a notifier that records every event it sees.

pub mod channel;
pub mod domain;
pub mod notifier;
