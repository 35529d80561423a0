//! Inbound ports: how the outer orchestration layer drives the adapter.

mod retrieval;

pub use retrieval::DemandPartner;
