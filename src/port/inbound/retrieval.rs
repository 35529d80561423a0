//! Demand retrieval entry point.

use async_trait::async_trait;

use crate::domain::{Batch, NormalizedResult, SessionId};
use crate::error::Error;

/// A demand source that answers a batch of slots with one result per slot.
///
/// Implementations must resolve with exactly `batch.len()` results in batch
/// order whatever happens on the wire; only caller mistakes such as an
/// invalid batch come back as `Err`.
#[async_trait]
pub trait DemandPartner: Send + Sync {
    /// Retrieve demand for one batch.
    async fn retrieve(
        &self,
        session: &SessionId,
        batch: &Batch,
    ) -> Result<Vec<NormalizedResult>, Error>;

    /// Partner identifier for logging and events.
    fn partner_id(&self) -> &str;
}
