//! `bucket`: show what a raw price turns into.

use serde_json::json;
use tracing::debug;

use super::command::BucketArgs;
use super::output;
use super::run::load_config;
use crate::domain::{BucketConfig, PriceBucketTransformer, RawPrice};
use crate::error::Result;

fn transform(config: Option<BucketConfig>, raw: &RawPrice) -> Result<Option<String>> {
    match config {
        Some(config) => Ok(Some(
            PriceBucketTransformer::new(config)?
                .apply(raw)?
                .to_targeting_string(),
        )),
        None => Ok(None),
    }
}

/// Execute `bucket`.
pub fn execute(args: &BucketArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let raw = RawPrice::from_json(&serde_json::Value::String(args.price.clone()))
        .unwrap_or_else(|| RawPrice::Sentinel(args.price.clone()));

    debug!(raw = %raw, deployment = ?config.adapter.deployment, "Bucketing price");

    let targeting = transform(config.adapter.targeting_buckets(), &raw)?;
    let price = transform(config.adapter.price_buckets(), &raw)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "bucket",
            "raw": raw.to_string(),
            "targeting": targeting,
            "price": price,
        }));
        return Ok(());
    }

    output::section("Price");
    output::field("Raw", &raw);
    output::field("Targeting", targeting.as_deref().unwrap_or("-"));
    output::field("Price", price.as_deref().unwrap_or("-"));
    Ok(())
}
