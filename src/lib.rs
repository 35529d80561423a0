//! slotbid - single-request header bidding demand adapter.
//!
//! Requests demand for a batch of ad slots with one outbound call, matches
//! the out-of-band response back to the waiting operation through a
//! correlation id, and normalizes it into exactly one bid or pass per slot.
//!
//! # Architecture
//!
//! - [`domain`] - Slots, batches, price bucketing, normalized results
//! - [`port`] - Inbound `DemandPartner` and outbound channel, id and
//!   notifier traits
//! - [`application`] - Request builder, callback correlator, transport,
//!   response parser and the retriever tying them together
//! - [`adapter`] - HTTP delivery channel, UUID ids, CLI
//! - [`infrastructure`] - Configuration, logging and wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use slotbid::domain::{Batch, PlacementRef, SessionId, SlotRequest};
//! use slotbid::infrastructure::bootstrap::build_retriever;
//! use slotbid::infrastructure::config::Config;
//!
//! # async fn run() -> slotbid::error::Result<()> {
//! let retriever = build_retriever(&Config::default())?;
//! let batch: Batch = vec![SlotRequest::new("top", PlacementRef::new("key/top"))]
//!     .into_iter()
//!     .collect();
//! let results = retriever.retrieve(&SessionId::new("page-1"), &batch).await?;
//! assert_eq!(results.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
