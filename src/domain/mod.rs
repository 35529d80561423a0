//! Partner-agnostic domain types for demand retrieval.

pub mod bucket;
pub mod error;
pub mod id;
pub mod request;
pub mod response;
pub mod result;
pub mod slot;

pub use bucket::{
    Bucket, BucketConfig, BucketedPrice, PriceBucketTransformer, RawPrice, RoundingType,
    Transformed,
};
pub use error::DomainError;
pub use id::{CorrelationId, SessionId, SlotId};
pub use request::{KeyMaker, OutboundRequest};
pub use response::RawResponse;
pub use result::{Bid, NormalizedResult, Size, Targeting};
pub use slot::{Batch, PlacementRef, SlotRequest};
