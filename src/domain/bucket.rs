//! Price bucketing.
//!
//! Ad servers target on discrete price points, so a continuous bid price is
//! scaled, clamped to a floor, snapped to the step of the bucket it falls in
//! and finally divided back into output units.
//!
//! # Example
//!
//! ```
//! use slotbid::domain::bucket::{BucketConfig, PriceBucketTransformer, RawPrice};
//! use rust_decimal_macros::dec;
//!
//! let transformer = PriceBucketTransformer::new(BucketConfig::default_targeting()).unwrap();
//! let out = transformer.apply(&RawPrice::Amount(dec!(2549))).unwrap();
//!
//! assert_eq!(out.to_targeting_string(), "2500");
//! ```
//!
//! Arithmetic is checked: a price whose scaled or snapped value leaves the
//! `Decimal` range yields [`DomainError::PriceOutOfRange`] instead of a
//! bucket.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// How a scaled price is snapped to its bucket step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundingType {
    #[default]
    #[serde(alias = "floor")]
    Floor,
    #[serde(alias = "ceil")]
    Ceil,
    #[serde(alias = "none")]
    None,
}

impl RoundingType {
    fn snap(self, value: Decimal, step: Decimal) -> Option<Decimal> {
        let steps = match self {
            Self::Floor => value.checked_div(step)?.floor(),
            Self::Ceil => value.checked_div(step)?.ceil(),
            Self::None => return Some(value),
        };
        steps.checked_mul(step)
    }

    const fn output_strategy(self) -> RoundingStrategy {
        match self {
            Self::Floor => RoundingStrategy::ToNegativeInfinity,
            Self::Ceil => RoundingStrategy::ToPositiveInfinity,
            Self::None => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

/// One price band: values up to `max` snap to multiples of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub max: Decimal,
    pub step: Decimal,
}

impl Bucket {
    #[must_use]
    pub const fn new(max: Decimal, step: Decimal) -> Self {
        Self { max, step }
    }
}

/// Declarative bucketing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    #[serde(default = "one")]
    pub input_cents_multiplier: Decimal,
    #[serde(default = "one")]
    pub output_cents_divisor: Decimal,
    #[serde(default)]
    pub output_precision: u32,
    #[serde(default)]
    pub rounding_type: RoundingType,
    #[serde(default)]
    pub floor: Decimal,
    /// Ascending by `max`.
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

const fn one() -> Decimal {
    Decimal::ONE
}

impl BucketConfig {
    /// Build a validated configuration.
    pub fn try_new(
        input_cents_multiplier: Decimal,
        output_cents_divisor: Decimal,
        output_precision: u32,
        rounding_type: RoundingType,
        floor: Decimal,
        buckets: Vec<Bucket>,
    ) -> Result<Self, DomainError> {
        let config = Self {
            input_cents_multiplier,
            output_cents_divisor,
            output_precision,
            rounding_type,
            floor,
            buckets,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cents in, cents out, 5 cent steps up to $20 then $1 steps up to $50.
    #[must_use]
    pub fn default_targeting() -> Self {
        Self {
            input_cents_multiplier: Decimal::ONE,
            output_cents_divisor: Decimal::ONE,
            output_precision: 0,
            rounding_type: RoundingType::Floor,
            floor: Decimal::ZERO,
            buckets: vec![
                Bucket::new(Decimal::from(2000), Decimal::from(5)),
                Bucket::new(Decimal::from(5000), Decimal::from(100)),
            ],
        }
    }

    /// Cents in, cents out, no snapping.
    #[must_use]
    pub fn default_price() -> Self {
        Self {
            input_cents_multiplier: Decimal::ONE,
            output_cents_divisor: Decimal::ONE,
            output_precision: 0,
            rounding_type: RoundingType::None,
            floor: Decimal::ZERO,
            buckets: Vec::new(),
        }
    }

    /// Check multiplier, divisor, steps and bucket ordering.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.input_cents_multiplier <= Decimal::ZERO {
            return Err(DomainError::NonPositiveMultiplier {
                value: self.input_cents_multiplier,
            });
        }
        if self.output_cents_divisor <= Decimal::ZERO {
            return Err(DomainError::NonPositiveDivisor {
                value: self.output_cents_divisor,
            });
        }
        for (index, bucket) in self.buckets.iter().enumerate() {
            if bucket.step <= Decimal::ZERO {
                return Err(DomainError::NonPositiveStep { step: bucket.step });
            }
            if index > 0 && bucket.max <= self.buckets[index - 1].max {
                return Err(DomainError::BucketsNotAscending {
                    index,
                    max: bucket.max,
                });
            }
        }
        Ok(())
    }

    /// Step of the first bucket whose max covers `scaled`, falling back to
    /// the last bucket's step above every max.
    fn step_for(&self, scaled: Decimal) -> Option<Decimal> {
        self.buckets
            .iter()
            .find(|b| scaled <= b.max)
            .or_else(|| self.buckets.last())
            .map(|b| b.step)
    }
}

/// A raw price as delivered by the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// A numeric price, in input units.
    Amount(Decimal),
    /// Anything non-numeric (a pass marker, a pre-bucketed label, ...).
    Sentinel(String),
}

impl RawPrice {
    /// Interpret a JSON value as a price. Numeric strings, including
    /// exponent notation, count as numbers; values that are neither numbers
    /// nor strings yield `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => parse_decimal(&n.to_string()).map(Self::Amount),
            serde_json::Value::String(s) => Some(
                parse_decimal(s.trim())
                    .map(Self::Amount)
                    .unwrap_or_else(|| Self::Sentinel(s.clone())),
            ),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Amount(_))
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(d) => write!(f, "{d}"),
            Self::Sentinel(s) => write!(f, "{s}"),
        }
    }
}

/// A bucketed value with the precision it is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketedPrice {
    value: Decimal,
    precision: u32,
}

impl BucketedPrice {
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.value
    }

    #[must_use]
    pub const fn precision(&self) -> u32 {
        self.precision
    }
}

impl fmt::Display for BucketedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = self.value;
        rendered.rescale(self.precision);
        write!(f, "{rendered}")
    }
}

/// Output of a transform: either a bucketed number or the untouched sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    Bucketed(BucketedPrice),
    PassThrough(String),
}

impl Transformed {
    /// Targeting form: fixed decimals for numbers, sentinel as-is.
    #[must_use]
    pub fn to_targeting_string(&self) -> String {
        match self {
            Self::Bucketed(price) => price.to_string(),
            Self::PassThrough(s) => s.clone(),
        }
    }

    /// Price form, only for numeric outputs.
    #[must_use]
    pub fn as_price(&self) -> Option<Decimal> {
        match self {
            Self::Bucketed(price) => Some(price.value()),
            Self::PassThrough(_) => None,
        }
    }
}

/// Pure price transformer over a validated [`BucketConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBucketTransformer {
    config: BucketConfig,
}

impl PriceBucketTransformer {
    pub fn new(config: BucketConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &BucketConfig {
        &self.config
    }

    /// Transform a raw price. Sentinels pass through unchanged.
    pub fn apply(&self, raw: &RawPrice) -> Result<Transformed, DomainError> {
        match raw {
            RawPrice::Amount(amount) => self.bucket(*amount).map(Transformed::Bucketed),
            RawPrice::Sentinel(s) => Ok(Transformed::PassThrough(s.clone())),
        }
    }

    /// Bucket a numeric price.
    ///
    /// # Errors
    ///
    /// [`DomainError::PriceOutOfRange`] when scaling, snapping or dividing
    /// overflows.
    pub fn bucket(&self, amount: Decimal) -> Result<BucketedPrice, DomainError> {
        let config = &self.config;
        let out_of_range = || DomainError::PriceOutOfRange { amount };

        let scaled = amount
            .checked_mul(config.input_cents_multiplier)
            .ok_or_else(out_of_range)?
            .max(config.floor);

        let snapped = match config.step_for(scaled) {
            Some(step) => config
                .rounding_type
                .snap(scaled, step)
                .ok_or_else(out_of_range)?,
            None => scaled,
        };

        let value = snapped
            .checked_div(config.output_cents_divisor)
            .ok_or_else(out_of_range)?
            .round_dp_with_strategy(
                config.output_precision,
                config.rounding_type.output_strategy(),
            );

        Ok(BucketedPrice {
            value,
            precision: config.output_precision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn targeting() -> PriceBucketTransformer {
        PriceBucketTransformer::new(BucketConfig::default_targeting()).unwrap()
    }

    #[test]
    fn floors_to_step_of_second_bucket() {
        let t = targeting();
        assert_eq!(t.bucket(dec!(2500)).unwrap().value(), dec!(2500));
        assert_eq!(t.bucket(dec!(2549)).unwrap().value(), dec!(2500));
    }

    #[test]
    fn floors_to_step_of_first_bucket() {
        let t = targeting();
        assert_eq!(t.bucket(dec!(1999)).unwrap().value(), dec!(1995));
        assert_eq!(t.bucket(dec!(150)).unwrap().value(), dec!(150));
        assert_eq!(t.bucket(dec!(153)).unwrap().value(), dec!(150));
    }

    #[test]
    fn bucket_boundary_is_inclusive() {
        let t = targeting();
        assert_eq!(t.bucket(dec!(2000)).unwrap().value(), dec!(2000));
        assert_eq!(t.bucket(dec!(2003)).unwrap().value(), dec!(2000));
    }

    #[test]
    fn above_last_max_uses_last_step_without_clamp() {
        let t = targeting();
        assert_eq!(t.bucket(dec!(7350)).unwrap().value(), dec!(7300));
    }

    #[test]
    fn ceil_rounds_up_to_step() {
        let config = BucketConfig {
            rounding_type: RoundingType::Ceil,
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        assert_eq!(t.bucket(dec!(2501)).unwrap().value(), dec!(2600));
        assert_eq!(t.bucket(dec!(151)).unwrap().value(), dec!(155));
    }

    #[test]
    fn none_rounding_leaves_value() {
        let t = PriceBucketTransformer::new(BucketConfig::default_price()).unwrap();
        assert_eq!(t.bucket(dec!(151.4)).unwrap().value(), dec!(151));
        assert_eq!(t.bucket(dec!(151.5)).unwrap().value(), dec!(152));
    }

    #[test]
    fn clamps_to_floor() {
        let config = BucketConfig {
            floor: dec!(100),
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        assert_eq!(t.bucket(dec!(20)).unwrap().value(), dec!(100));
    }

    #[test]
    fn scales_input_and_divides_output() {
        // dollars in, dollars out with two decimals
        let config = BucketConfig {
            input_cents_multiplier: dec!(100),
            output_cents_divisor: dec!(100),
            output_precision: 2,
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        let out = t.apply(&RawPrice::Amount(dec!(1.53))).unwrap();
        assert_eq!(out.to_targeting_string(), "1.50");
        assert_eq!(out.as_price(), Some(dec!(1.50)));
    }

    #[test]
    fn targeting_string_pads_to_precision() {
        let config = BucketConfig {
            output_cents_divisor: dec!(100),
            output_precision: 2,
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        let out = t.apply(&RawPrice::Amount(dec!(2500))).unwrap();
        assert_eq!(out.to_targeting_string(), "25.00");
    }

    #[test]
    fn sentinel_passes_through() {
        let t = targeting();
        let out = t.apply(&RawPrice::Sentinel("pass".into())).unwrap();
        assert_eq!(out, Transformed::PassThrough("pass".into()));
        assert_eq!(out.as_price(), None);
    }

    #[test]
    fn repeated_application_is_identical() {
        let t = targeting();
        let raw = RawPrice::Amount(dec!(3333));
        assert_eq!(t.apply(&raw), t.apply(&raw));
    }

    #[test]
    fn ceil_overflow_near_decimal_max_is_out_of_range() {
        let config = BucketConfig {
            rounding_type: RoundingType::Ceil,
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        assert_eq!(
            t.bucket(Decimal::MAX),
            Err(DomainError::PriceOutOfRange {
                amount: Decimal::MAX
            })
        );
    }

    #[test]
    fn scaling_overflow_is_out_of_range() {
        let config = BucketConfig {
            input_cents_multiplier: dec!(100),
            rounding_type: RoundingType::Ceil,
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        let raw = RawPrice::from_json(&serde_json::json!("1000000000000000000000000000")).unwrap();
        assert!(matches!(
            t.apply(&raw),
            Err(DomainError::PriceOutOfRange { .. })
        ));
    }

    #[test]
    fn fractional_step_overflow_is_out_of_range() {
        // dollar buckets: dividing by a step below 1 grows the value
        let config = BucketConfig {
            output_precision: 2,
            buckets: vec![Bucket::new(dec!(20), dec!(0.05))],
            ..BucketConfig::default_targeting()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        assert!(matches!(
            t.bucket(dec!(70000000000000000000000000000)),
            Err(DomainError::PriceOutOfRange { .. })
        ));
        assert_eq!(t.bucket(dec!(1.53)).unwrap().value(), dec!(1.50));
    }

    #[test]
    fn fractional_divisor_overflow_is_out_of_range() {
        let config = BucketConfig {
            output_cents_divisor: dec!(0.01),
            ..BucketConfig::default_price()
        };
        let t = PriceBucketTransformer::new(config).unwrap();
        assert!(t.bucket(dec!(70000000000000000000000000000)).is_err());
    }

    #[test]
    fn rejects_descending_buckets() {
        let config = BucketConfig {
            buckets: vec![Bucket::new(dec!(5000), dec!(100)), Bucket::new(dec!(2000), dec!(5))],
            ..BucketConfig::default_targeting()
        };
        assert!(matches!(
            PriceBucketTransformer::new(config),
            Err(DomainError::BucketsNotAscending { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_zero_step() {
        let config = BucketConfig {
            buckets: vec![Bucket::new(dec!(5000), dec!(0))],
            ..BucketConfig::default_targeting()
        };
        assert!(matches!(
            config.validate(),
            Err(DomainError::NonPositiveStep { .. })
        ));
    }

    #[test]
    fn raw_price_from_json_number_and_string() {
        assert_eq!(
            RawPrice::from_json(&serde_json::json!(150)),
            Some(RawPrice::Amount(dec!(150)))
        );
        assert_eq!(
            RawPrice::from_json(&serde_json::json!("12.5")),
            Some(RawPrice::Amount(dec!(12.5)))
        );
        assert_eq!(
            RawPrice::from_json(&serde_json::json!("deal")),
            Some(RawPrice::Sentinel("deal".into()))
        );
        assert_eq!(RawPrice::from_json(&serde_json::json!(null)), None);
    }

    #[test]
    fn exponent_notation_is_numeric_in_numbers_and_strings() {
        let number: serde_json::Value = serde_json::from_str("1e3").unwrap();
        assert_eq!(RawPrice::from_json(&number), Some(RawPrice::Amount(dec!(1000))));
        assert_eq!(
            RawPrice::from_json(&serde_json::json!("1e3")),
            Some(RawPrice::Amount(dec!(1000)))
        );
        assert_eq!(
            RawPrice::from_json(&serde_json::json!("2.5E2")),
            Some(RawPrice::Amount(dec!(250)))
        );
    }
}
