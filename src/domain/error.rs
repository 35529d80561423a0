//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors that validate inputs,
//! such as [`BucketConfig::try_new`](crate::domain::bucket::BucketConfig::try_new).
//!
//! # Examples
//!
//! ```
//! use slotbid::domain::bucket::{Bucket, BucketConfig, RoundingType};
//! use slotbid::domain::error::DomainError;
//! use rust_decimal_macros::dec;
//!
//! let result = BucketConfig::try_new(
//!     dec!(1),
//!     dec!(1),
//!     0,
//!     RoundingType::Floor,
//!     dec!(0),
//!     vec![Bucket::new(dec!(5000), dec!(100)), Bucket::new(dec!(2000), dec!(5))],
//! );
//!
//! assert!(matches!(result, Err(DomainError::BucketsNotAscending { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bucket maxima must be strictly ascending.
    #[error("bucket max {max} at index {index} is not above the previous bucket")]
    BucketsNotAscending {
        /// Position of the offending bucket.
        index: usize,
        /// The offending maximum.
        max: Decimal,
    },

    /// Every bucket step must be positive.
    #[error("bucket step must be positive, got {step}")]
    NonPositiveStep {
        /// The invalid step.
        step: Decimal,
    },

    /// The multiplier applied to raw input must be positive.
    #[error("input cents multiplier must be positive, got {value}")]
    NonPositiveMultiplier {
        /// The invalid multiplier.
        value: Decimal,
    },

    /// The divisor applied to bucketed output must be positive.
    #[error("output cents divisor must be positive, got {value}")]
    NonPositiveDivisor {
        /// The invalid divisor.
        value: Decimal,
    },

    /// Bucketing the price left the representable range.
    #[error("price {amount} cannot be bucketed without overflow")]
    PriceOutOfRange {
        /// The raw amount before scaling.
        amount: Decimal,
    },

    /// Slot identifiers cannot be blank.
    #[error("slot id cannot be empty")]
    EmptySlotId,
}
