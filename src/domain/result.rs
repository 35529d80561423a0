//! Normalized per-slot outcomes.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::bucket::RawPrice;
use super::id::SlotId;

/// Creative dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Targeting key-values attached to a bid.
pub type Targeting = BTreeMap<String, Vec<String>>;

/// A usable bid for one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bid {
    pub slot_id: SlotId,
    pub size: Size,
    pub raw_price: RawPrice,
    /// Targeting-bucket output, when a targeting transformer is configured.
    pub bucketed_value: Option<String>,
    /// Numeric price output, when a price transformer is configured and the
    /// raw price is numeric.
    pub price: Option<Decimal>,
    pub targeting: Targeting,
    /// Creative markup, when enabled.
    pub creative: Option<String>,
}

/// Outcome for one slot of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NormalizedResult {
    Bid(Bid),
    Pass { slot_id: SlotId },
}

impl NormalizedResult {
    #[must_use]
    pub fn pass(slot_id: SlotId) -> Self {
        Self::Pass { slot_id }
    }

    #[must_use]
    pub fn slot_id(&self) -> &SlotId {
        match self {
            Self::Bid(bid) => &bid.slot_id,
            Self::Pass { slot_id } => slot_id,
        }
    }

    #[must_use]
    pub fn is_bid(&self) -> bool {
        matches!(self, Self::Bid(_))
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    #[must_use]
    pub fn as_bid(&self) -> Option<&Bid> {
        match self {
            Self::Bid(bid) => Some(bid),
            Self::Pass { .. } => None,
        }
    }
}
