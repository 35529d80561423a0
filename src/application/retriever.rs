//! Retrieval orchestrator.
//!
//! Drives one batch through build, send and parse, and turns every
//! non-caller failure into an all-pass result. Only an invalid batch is
//! reported back as an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::application::parser::{all_pass, ResponseParser};
use crate::application::request::RequestBuilder;
use crate::application::transport::{Transport, TransportOutcome};
use crate::domain::{Batch, CorrelationId, NormalizedResult, SessionId, SlotId};
use crate::error::{Error, RetrievalError};
use crate::port::{
    DemandPartner, Event, InternalErrorEvent, NotifierRegistry, RequestCompleteEvent,
    RequestStatus, SlotGroupEvent,
};

/// One-request-per-batch demand retriever.
pub struct Retriever {
    partner_id: String,
    timeout: Duration,
    analytics: bool,
    builder: RequestBuilder,
    transport: Transport,
    parser: ResponseParser,
    notifiers: Arc<NotifierRegistry>,
}

impl Retriever {
    pub fn new(
        partner_id: impl Into<String>,
        timeout: Duration,
        builder: RequestBuilder,
        transport: Transport,
        parser: ResponseParser,
    ) -> Self {
        Self {
            partner_id: partner_id.into(),
            timeout,
            analytics: true,
            builder,
            transport,
            parser,
            notifiers: Arc::new(NotifierRegistry::new()),
        }
    }

    /// Route observability events to `notifiers`.
    #[must_use]
    pub fn with_notifiers(mut self, notifiers: Arc<NotifierRegistry>) -> Self {
        self.notifiers = notifiers;
        self
    }

    /// Toggle per-slot lifecycle events. Completion and internal errors are
    /// always reported.
    #[must_use]
    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics = enabled;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retrieve demand for one batch.
    ///
    /// Results come back in batch order, one per slot.
    pub async fn retrieve(
        &self,
        session: &SessionId,
        batch: &Batch,
    ) -> Result<Vec<NormalizedResult>, RetrievalError> {
        if batch.is_empty() {
            debug!(partner = %self.partner_id, "Empty batch, nothing to retrieve");
            return Ok(Vec::new());
        }

        let request = self.builder.build(batch)?;
        let correlation_id = request.correlation_id.clone();

        self.emit_groups(session, batch, Event::RequestSent);

        let outcome = self.transport.send(&request, self.timeout).await;

        let (results, status) = match outcome {
            TransportOutcome::Success(raw) => {
                let report = self.parser.parse(&raw, batch);
                for anomaly in &report.anomalies {
                    warn!(
                        partner = %self.partner_id,
                        correlation_id = %correlation_id,
                        anomaly = %anomaly,
                        "Response anomaly"
                    );
                    self.notifiers
                        .notify_all(Event::InternalError(InternalErrorEvent {
                            partner_id: self.partner_id.clone(),
                            message: anomaly.to_string(),
                        }));
                }
                self.emit_results(session, batch, &report.results);
                (report.results, RequestStatus::Success)
            }
            TransportOutcome::Timeout => {
                info!(
                    partner = %self.partner_id,
                    correlation_id = %correlation_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Request timed out, passing on every slot"
                );
                self.emit_groups(session, batch, Event::Timeout);
                (all_pass(batch), RequestStatus::Timeout)
            }
            TransportOutcome::Failure(reason) => {
                warn!(
                    partner = %self.partner_id,
                    correlation_id = %correlation_id,
                    reason = %reason,
                    "Request failed, passing on every slot"
                );
                self.emit_groups(session, batch, Event::Error);
                (all_pass(batch), RequestStatus::Error)
            }
        };

        self.complete(session, correlation_id, status, batch.len());
        Ok(results)
    }

    /// Retrieve several batches concurrently, one request each.
    ///
    /// Results come back in input order.
    pub async fn retrieve_all(
        &self,
        session: &SessionId,
        batches: &[Batch],
    ) -> Vec<Result<Vec<NormalizedResult>, RetrievalError>> {
        join_all(batches.iter().map(|batch| self.retrieve(session, batch))).await
    }

    fn group_event(
        &self,
        session: &SessionId,
        ht_slot_name: String,
        slot_ids: Vec<SlotId>,
    ) -> SlotGroupEvent {
        SlotGroupEvent {
            session_id: session.clone(),
            partner_id: self.partner_id.clone(),
            ht_slot_name,
            slot_ids,
        }
    }

    fn emit_groups(&self, session: &SessionId, batch: &Batch, kind: fn(SlotGroupEvent) -> Event) {
        if !self.analytics {
            return;
        }
        for (ht_slot_name, slot_ids) in batch.ht_slot_groups() {
            self.notifiers
                .notify_all(kind(self.group_event(session, ht_slot_name, slot_ids)));
        }
    }

    /// One `BidFound` per bid, one `Pass` per page-side slot with passes.
    fn emit_results(&self, session: &SessionId, batch: &Batch, results: &[NormalizedResult]) {
        if !self.analytics {
            return;
        }
        for (ht_slot_name, slot_ids) in batch.ht_slot_groups() {
            let mut passed = Vec::new();
            for slot_id in slot_ids {
                let is_bid = results
                    .iter()
                    .any(|r| r.slot_id() == &slot_id && r.is_bid());
                if is_bid {
                    self.notifiers.notify_all(Event::BidFound(self.group_event(
                        session,
                        ht_slot_name.clone(),
                        vec![slot_id],
                    )));
                } else {
                    passed.push(slot_id);
                }
            }
            if !passed.is_empty() {
                self.notifiers
                    .notify_all(Event::Pass(self.group_event(session, ht_slot_name, passed)));
            }
        }
    }

    fn complete(
        &self,
        session: &SessionId,
        correlation_id: CorrelationId,
        status: RequestStatus,
        slots: usize,
    ) {
        self.notifiers
            .notify_all(Event::RequestComplete(RequestCompleteEvent {
                session_id: session.clone(),
                partner_id: self.partner_id.clone(),
                correlation_id,
                status,
                slots,
            }));
    }
}

#[async_trait]
impl DemandPartner for Retriever {
    async fn retrieve(
        &self,
        session: &SessionId,
        batch: &Batch,
    ) -> Result<Vec<NormalizedResult>, Error> {
        Ok(Retriever::retrieve(self, session, batch).await?)
    }

    fn partner_id(&self) -> &str {
        &self.partner_id
    }
}
