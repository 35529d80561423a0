//! Composition root: turns a [`Config`] into a ready [`Retriever`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::http::HttpDeliveryChannel;
use crate::adapter::outbound::id::UuidGenerator;
use crate::application::{
    CallbackCorrelator, RequestBuilder, ResponseParser, Retriever, Transport,
};
use crate::domain::PriceBucketTransformer;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{DeliveryChannel, LogNotifier, NotifierRegistry};

/// Build the notifier registry. Events always go to the log.
#[must_use]
pub fn build_notifier_registry() -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Build the response parser for the configured line item type and
/// deployment.
pub fn build_parser(config: &Config) -> Result<ResponseParser> {
    let adapter = &config.adapter;
    let mut parser = ResponseParser::new(
        adapter.line_item_type.targeting_mode(),
        config.partner.targeting_keys.om.clone(),
    )
    .with_creative(adapter.return_creative);

    if let Some(buckets) = adapter.targeting_buckets() {
        parser = parser.with_targeting(PriceBucketTransformer::new(buckets)?);
    }
    if let Some(buckets) = adapter.price_buckets() {
        parser = parser.with_price(PriceBucketTransformer::new(buckets)?);
    }
    Ok(parser)
}

/// Build a retriever over `channel`, sharing the process-wide correlator.
pub fn build_retriever_with_channel(
    config: &Config,
    channel: Arc<dyn DeliveryChannel>,
    notifiers: Arc<NotifierRegistry>,
) -> Result<Retriever> {
    let builder = RequestBuilder::new(
        config.base_url()?,
        config.adapter.callback_name.clone(),
        Arc::new(UuidGenerator),
    );
    let transport = Transport::new(channel, CallbackCorrelator::global());
    let parser = build_parser(config)?;

    info!(
        partner = %config.partner.id,
        base_url = %config.adapter.base_url,
        timeout_ms = config.adapter.timeout_ms,
        mode = ?parser.mode(),
        "Retriever configured"
    );

    Ok(
        Retriever::new(config.partner.id.clone(), config.timeout(), builder, transport, parser)
            .with_analytics(config.partner.analytics)
            .with_notifiers(notifiers),
    )
}

/// Build a retriever that talks HTTP and logs its events.
pub fn build_retriever(config: &Config) -> Result<Retriever> {
    let channel: Arc<dyn DeliveryChannel> = Arc::new(HttpDeliveryChannel::from_config(&config.http));
    build_retriever_with_channel(config, channel, Arc::new(build_notifier_registry()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::TargetingMode;
    use crate::domain::SessionId;
    use crate::infrastructure::config::partner::{Deployment, LineItemType};
    use crate::testkit::channel::{Script, ScriptedChannel};
    use crate::testkit::domain::{batch, bid_entry, response};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn parser_follows_line_item_type() {
        let mut config = Config::default();
        config.adapter.line_item_type = LineItemType::Custom;

        assert_eq!(build_parser(&config).unwrap().mode(), TargetingMode::PassThrough);
    }

    #[tokio::test]
    async fn wired_retriever_end_to_end() {
        let body = response(&[("A", bid_entry(300, 250, json!("2549"), "aid"))]);
        let channel: Arc<dyn DeliveryChannel> = Arc::new(ScriptedChannel::new(Script::Deliver(body)));
        let retriever = build_retriever_with_channel(
            &Config::default(),
            channel,
            Arc::new(NotifierRegistry::new()),
        )
        .unwrap();

        let results = retriever
            .retrieve(&SessionId::new("s"), &batch(&["A"]))
            .await
            .unwrap();
        let bid = results[0].as_bid().unwrap();

        assert_eq!(bid.targeting["ix_sbi_om"], vec!["300x250_2500".to_string()]);
        assert_eq!(bid.price, Some(dec!(2549)));
    }

    #[tokio::test]
    async fn targeting_only_deployment_has_no_price() {
        let mut config = Config::default();
        config.adapter.deployment = Deployment::TargetingOnly;
        let body = response(&[("A", bid_entry(300, 250, json!(100), "aid"))]);
        let channel: Arc<dyn DeliveryChannel> = Arc::new(ScriptedChannel::new(Script::Deliver(body)));
        let retriever =
            build_retriever_with_channel(&config, channel, Arc::new(NotifierRegistry::new()))
                .unwrap();

        let results = retriever
            .retrieve(&SessionId::new("s"), &batch(&["A"]))
            .await
            .unwrap();

        assert_eq!(results[0].as_bid().unwrap().price, None);
    }
}
