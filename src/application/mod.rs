//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement demand retrieval.

pub mod correlator;
pub mod parser;
pub mod request;
pub mod retriever;
pub mod transport;

pub use correlator::CallbackCorrelator;
pub use parser::{ParseAnomaly, ParseReport, ResponseParser, TargetingMode};
pub use request::RequestBuilder;
pub use retriever::Retriever;
pub use transport::{Transport, TransportOutcome};
