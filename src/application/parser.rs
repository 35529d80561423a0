//! Response parser: raw payload plus batch in, one normalized result per slot.
//!
//! Bid entries look like
//!
//! ```json
//! { "sbi_size": [300, 250], "sbi_mouse": 150, "sbi_aid": "30292e432662bd5f86d90774b944b039" }
//! ```
//!
//! and the page-level `sbi_dc` hint (the creative server prefix) sits next
//! to `slots`. The hint is replicated onto every bid of the batch.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{
    Batch, Bid, NormalizedResult, PriceBucketTransformer, RawPrice, RawResponse, Size, SlotId,
    Targeting,
};

/// Creative size field.
pub const SIZE_FIELD: &str = "sbi_size";
/// Raw price field.
pub const PRICE_FIELD: &str = "sbi_mouse";
/// Ad id field.
pub const AID_FIELD: &str = "sbi_aid";
/// Page-level data-center hint.
pub const DC_FIELD: &str = "sbi_dc";

/// How returned bid fields become targeting key-values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// Size plus bucketed price under the configured key, plus the ad id.
    #[default]
    Bucketed,
    /// Every returned field copied verbatim.
    PassThrough,
}

/// A bid entry (or the whole response) that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {reason}", slot_label(.slot_id))]
pub struct ParseAnomaly {
    /// `None` for batch-wide problems.
    pub slot_id: Option<SlotId>,
    pub reason: String,
}

fn slot_label(slot_id: &Option<SlotId>) -> String {
    match slot_id {
        Some(id) => format!("slot {id}"),
        None => "response".to_string(),
    }
}

/// Parser output: results in batch order plus anything worth reporting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseReport {
    pub results: Vec<NormalizedResult>,
    pub anomalies: Vec<ParseAnomaly>,
}

/// Turns raw responses into normalized results.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    mode: TargetingMode,
    om_key: String,
    targeting: Option<PriceBucketTransformer>,
    price: Option<PriceBucketTransformer>,
    return_creative: bool,
}

impl ResponseParser {
    pub fn new(mode: TargetingMode, om_key: impl Into<String>) -> Self {
        Self {
            mode,
            om_key: om_key.into(),
            targeting: None,
            price: None,
            return_creative: false,
        }
    }

    /// Bucket targeting values with `transformer`.
    #[must_use]
    pub fn with_targeting(mut self, transformer: PriceBucketTransformer) -> Self {
        self.targeting = Some(transformer);
        self
    }

    /// Produce numeric prices with `transformer`.
    #[must_use]
    pub fn with_price(mut self, transformer: PriceBucketTransformer) -> Self {
        self.price = Some(transformer);
        self
    }

    #[must_use]
    pub fn with_creative(mut self, enabled: bool) -> Self {
        self.return_creative = enabled;
        self
    }

    #[must_use]
    pub fn mode(&self) -> TargetingMode {
        self.mode
    }

    /// Parse `raw` against `batch`. Never fails; bad entries become passes.
    #[must_use]
    pub fn parse(&self, raw: &RawResponse, batch: &Batch) -> ParseReport {
        let Some(slots) = raw.slots() else {
            return ParseReport {
                results: all_pass(batch),
                anomalies: vec![ParseAnomaly {
                    slot_id: None,
                    reason: "response has no slots object".into(),
                }],
            };
        };

        let dc = raw.page_field(DC_FIELD).and_then(scalar_string);

        let mut report = ParseReport {
            results: Vec::with_capacity(batch.len()),
            anomalies: Vec::new(),
        };

        for slot in batch {
            let result = match slots.get(slot.slot_id.as_str()) {
                None => NormalizedResult::pass(slot.slot_id.clone()),
                Some(entry) if is_empty(entry) => NormalizedResult::pass(slot.slot_id.clone()),
                Some(entry) => match self.parse_bid(&slot.slot_id, entry, dc.as_deref()) {
                    Ok(bid) => NormalizedResult::Bid(bid),
                    Err(reason) => {
                        report.anomalies.push(ParseAnomaly {
                            slot_id: Some(slot.slot_id.clone()),
                            reason,
                        });
                        NormalizedResult::pass(slot.slot_id.clone())
                    }
                },
            };
            report.results.push(result);
        }

        report
    }

    fn parse_bid(&self, slot_id: &SlotId, entry: &Value, dc: Option<&str>) -> Result<Bid, String> {
        let fields = entry
            .as_object()
            .ok_or_else(|| "bid entry is not an object".to_string())?;

        let size = parse_size(fields.get(SIZE_FIELD))?;
        let raw_price = fields
            .get(PRICE_FIELD)
            .and_then(RawPrice::from_json)
            .ok_or_else(|| format!("missing or unreadable {PRICE_FIELD}"))?;
        let aid = fields.get(AID_FIELD).and_then(scalar_string);

        let bucketed_value = self
            .targeting
            .as_ref()
            .map(|t| t.apply(&raw_price))
            .transpose()
            .map_err(|e| e.to_string())?
            .map(|out| out.to_targeting_string());

        let mut targeting = match self.mode {
            TargetingMode::PassThrough => pass_through_targeting(fields),
            TargetingMode::Bucketed => {
                let label = bucketed_value
                    .clone()
                    .unwrap_or_else(|| raw_price.to_string());
                let mut targeting = Targeting::new();
                targeting.insert(self.om_key.clone(), vec![format!("{size}_{label}")]);
                if let Some(aid) = &aid {
                    targeting.insert(AID_FIELD.to_string(), vec![aid.clone()]);
                }
                targeting
            }
        };

        if let Some(dc) = dc {
            targeting.insert(DC_FIELD.to_string(), vec![dc.to_string()]);
        }

        let price: Option<Decimal> = match &self.price {
            Some(t) => t.apply(&raw_price).map_err(|e| e.to_string())?.as_price(),
            None => None,
        };

        let creative = if self.return_creative {
            aid.as_deref().map(|aid| creative_markup(dc.unwrap_or_default(), aid))
        } else {
            None
        };

        Ok(Bid {
            slot_id: slot_id.clone(),
            size,
            raw_price,
            bucketed_value,
            price,
            targeting,
            creative,
        })
    }
}

/// All-pass results for `batch`, in order.
#[must_use]
pub fn all_pass(batch: &Batch) -> Vec<NormalizedResult> {
    batch
        .iter()
        .map(|slot| NormalizedResult::pass(slot.slot_id.clone()))
        .collect()
}

/// Script tag that renders the winning creative from the partner's server.
#[must_use]
pub fn creative_markup(dc: &str, aid: &str) -> String {
    format!(
        "<script type=\"text/javascript\" src=\"//{dc}apex.go.sonobi.com/sbi.js?as=dfp&aid={aid}\"></script>"
    )
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn parse_size(value: Option<&Value>) -> Result<Size, String> {
    let invalid = || format!("missing or invalid {SIZE_FIELD}");
    let items = value.and_then(Value::as_array).ok_or_else(invalid)?;
    if items.len() != 2 {
        return Err(invalid());
    }
    let dimension = |v: &Value| -> Option<u32> {
        match v {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    };
    match (dimension(&items[0]), dimension(&items[1])) {
        (Some(width), Some(height)) => Ok(Size::new(width, height)),
        _ => Err(invalid()),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn pass_through_targeting(fields: &Map<String, Value>) -> Targeting {
    fields
        .iter()
        .map(|(key, value)| {
            let values = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| scalar_string(item).unwrap_or_else(|| item.to_string()))
                    .collect(),
                Value::Null => Vec::new(),
                Value::Object(_) => vec![value.to_string()],
                other => scalar_string(other).into_iter().collect(),
            };
            (key.clone(), values)
        })
        .collect()
}
