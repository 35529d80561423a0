//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use super::output;
use super::run::load_config;
use crate::error::Result;

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    load_config(Some(path))?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
        }));
        return Ok(());
    }

    output::success(&format!("{} is valid", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    let adapter = &config.adapter;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "partner": config.partner.id,
            "base_url": adapter.base_url,
            "callback_name": adapter.callback_name,
            "timeout_ms": adapter.timeout_ms,
            "targeting_mode": format!("{:?}", adapter.line_item_type.targeting_mode()),
            "targeting_buckets": adapter.targeting_buckets(),
            "price_buckets": adapter.price_buckets(),
            "return_creative": adapter.return_creative,
        }));
        return Ok(());
    }

    output::section("Partner");
    output::field("Id", &config.partner.id);
    output::field("Analytics", config.partner.analytics);
    output::field("Targeting key", &config.partner.targeting_keys.om);

    output::section("Adapter");
    output::field("Endpoint", &adapter.base_url);
    output::field("Callback", &adapter.callback_name);
    output::field("Timeout", format!("{}ms", adapter.timeout_ms));
    output::field(
        "Targeting",
        format!("{:?}", adapter.line_item_type.targeting_mode()),
    );
    output::field("Deployment", format!("{:?}", adapter.deployment));
    output::field("Creative", adapter.return_creative);
    if adapter.bid_transformer.is_some() {
        output::note("custom bid transformer configured");
    }
    Ok(())
}
