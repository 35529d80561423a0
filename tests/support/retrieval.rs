use std::sync::Arc;
use std::time::Duration;

use slotbid::application::{
    CallbackCorrelator, RequestBuilder, ResponseParser, Retriever, TargetingMode, Transport,
};
use slotbid::domain::{BucketConfig, PriceBucketTransformer};
use slotbid::port::{DeliveryChannel, NotifierRegistry};
use slotbid::testkit::channel::{Script, ScriptedChannel};
use slotbid::testkit::domain::SequentialIds;
use slotbid::testkit::notifier::RecordingNotifier;
use url::Url;

pub struct Harness {
    pub retriever: Retriever,
    pub channel: Arc<ScriptedChannel>,
    pub correlator: Arc<CallbackCorrelator>,
    pub events: RecordingNotifier,
}

pub fn bucketed_parser() -> ResponseParser {
    ResponseParser::new(TargetingMode::Bucketed, "ix_sbi_om")
        .with_targeting(
            PriceBucketTransformer::new(BucketConfig::default_targeting()).expect("targeting"),
        )
        .with_price(PriceBucketTransformer::new(BucketConfig::default_price()).expect("price"))
}

pub fn harness(script: Script, timeout: Duration) -> Harness {
    harness_with_parser(script, timeout, bucketed_parser())
}

pub fn harness_with_parser(script: Script, timeout: Duration, parser: ResponseParser) -> Harness {
    let channel = Arc::new(ScriptedChannel::new(script));
    let correlator = Arc::new(CallbackCorrelator::new());
    let events = RecordingNotifier::new();
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(events.clone()));

    let builder = RequestBuilder::new(
        Url::parse("https://apex.go.sonobi.com/trinity.js").expect("url"),
        "sbi",
        Arc::new(SequentialIds::new("it")),
    );
    let dyn_channel: Arc<dyn DeliveryChannel> = channel.clone();
    let transport = Transport::new(dyn_channel, Arc::clone(&correlator));

    Harness {
        retriever: Retriever::new("SonobiHtb", timeout, builder, transport, parser)
            .with_notifiers(Arc::new(registry)),
        channel,
        correlator,
        events,
    }
}
