//! Request builder: one batch in, one outbound request out.

use std::sync::Arc;

use url::Url;

use crate::domain::{Batch, CorrelationId, KeyMaker, OutboundRequest};
use crate::error::RetrievalError;
use crate::port::IdGenerator;

/// Query parameter carrying the URL-encoded key maker JSON.
pub const KEY_MAKER_PARAM: &str = "key_maker";

/// Query parameter naming the callback the response is wrapped in.
pub const CALLBACK_PARAM: &str = "cv";

/// Builds the single outbound request for a batch.
pub struct RequestBuilder {
    base_url: Url,
    callback_name: String,
    ids: Arc<dyn IdGenerator>,
}

impl RequestBuilder {
    pub fn new(base_url: Url, callback_name: impl Into<String>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            base_url,
            callback_name: callback_name.into(),
            ids,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the request for `batch` and mint its correlation id.
    ///
    /// Empty batches and batches with repeated slot ids are rejected; callers
    /// that want an empty result for an empty batch go through the retriever.
    pub fn build(&self, batch: &Batch) -> Result<OutboundRequest, RetrievalError> {
        if batch.is_empty() {
            return Err(RetrievalError::InvalidBatch {
                reason: "batch is empty".into(),
            });
        }
        if let Some(duplicate) = batch.first_duplicate() {
            return Err(RetrievalError::InvalidBatch {
                reason: format!("slot id '{duplicate}' appears more than once"),
            });
        }

        let mut key_maker = KeyMaker::default();
        for slot in batch {
            key_maker.insert(slot.slot_id.clone(), slot.placement.placement_key.clone());
        }

        let encoded =
            serde_json::to_string(&key_maker).map_err(|e| RetrievalError::InvalidBatch {
                reason: format!("key maker not serializable: {e}"),
            })?;

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(KEY_MAKER_PARAM, &encoded)
            .append_pair(CALLBACK_PARAM, &self.callback_name);

        let correlation_id = CorrelationId::new(format!("_{}", self.ids.generate()));

        Ok(OutboundRequest {
            url,
            correlation_id,
            key_maker,
        })
    }
}
