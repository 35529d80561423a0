//! `retrieve`: run one live retrieval and print the results.

use std::sync::Arc;

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::RetrieveArgs;
use super::output;
use super::run::load_config;
use crate::domain::{Batch, NormalizedResult, PlacementRef, SessionId, SlotRequest};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::{NotifierRegistry, NullNotifier};

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Raw")]
    raw: String,
    #[tabled(rename = "Targeting")]
    targeting: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&NormalizedResult> for ResultRow {
    fn from(result: &NormalizedResult) -> Self {
        match result {
            NormalizedResult::Bid(bid) => Self {
                slot: bid.slot_id.to_string(),
                outcome: "bid",
                size: bid.size.to_string(),
                raw: bid.raw_price.to_string(),
                targeting: bid
                    .targeting
                    .iter()
                    .map(|(key, values)| format!("{key}={}", values.join(",")))
                    .collect::<Vec<_>>()
                    .join(" "),
                price: bid.price.map_or_else(|| "-".to_string(), |p| p.to_string()),
            },
            NormalizedResult::Pass { slot_id } => Self {
                slot: slot_id.to_string(),
                outcome: "pass",
                size: "-".into(),
                raw: "-".into(),
                targeting: "-".into(),
                price: "-".into(),
            },
        }
    }
}

fn batch_from_args(slots: &[(String, String)]) -> Batch {
    slots
        .iter()
        .map(|(slot, key)| SlotRequest::new(slot.as_str(), PlacementRef::new(key.as_str())))
        .collect()
}

/// Execute `retrieve`.
pub async fn execute(args: &RetrieveArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(timeout_ms) = args.timeout_ms {
        config.adapter.timeout_ms = timeout_ms.max(1);
    }

    let notifiers = if output::is_quiet() {
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(NullNotifier));
        registry
    } else {
        bootstrap::build_notifier_registry()
    };
    let retriever = bootstrap::build_retriever(&config)?.with_notifiers(Arc::new(notifiers));

    let batch = batch_from_args(&args.slots);
    let session = SessionId::new(args.session.as_str());
    let results = retriever.retrieve(&session, &batch).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "retrieve",
            "session": session.as_str(),
            "results": results,
        }));
        return Ok(());
    }

    let bids = results.iter().filter(|r| r.is_bid()).count();
    output::section("Results");
    output::field("Timeout", format!("{}ms", config.adapter.timeout_ms));
    output::field("Bids", format!("{bids}/{}", results.len()));
    let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SlotId;

    #[test]
    fn batch_keeps_argument_order() {
        let batch = batch_from_args(&[
            ("b".to_string(), "k2".to_string()),
            ("a".to_string(), "k1".to_string()),
        ]);
        let ids: Vec<&str> = batch.iter().map(|s| s.slot_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(batch.slots()[0].placement.placement_key, "k2");
    }

    #[test]
    fn pass_row_is_dashed() {
        let row = ResultRow::from(&NormalizedResult::pass(SlotId::new("x")));
        assert_eq!(row.outcome, "pass");
        assert_eq!(row.price, "-");
    }
}
