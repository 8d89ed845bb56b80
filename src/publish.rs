//! Publication of the histogram to object storage.

use tracing::info;
use usagewatch_adapters::ObjectStore;
use usagewatch_types::UsageHistogram;

use crate::PipelineError;

/// Default bucket the histogram is published to.
pub const DEFAULT_BUCKET: &str = "tinker-access";

/// Default object key of the published histogram.
pub const DEFAULT_KEY: &str = "tinker-access-stats.json";

/// Writes the histogram as a publicly readable JSON object.
#[derive(Debug)]
pub struct Publisher {
    store: Box<dyn ObjectStore>,
    bucket: String,
    key: String,
}

impl Publisher {
    pub fn new(store: Box<dyn ObjectStore>, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Store the histogram, then grant public read on it.
    ///
    /// Nothing is retried: any storage failure ends the run.
    pub async fn publish(&self, histogram: &UsageHistogram) -> Result<(), PipelineError> {
        let body = serde_json::to_vec(histogram)?;
        let bytes = body.len();

        self.store
            .put_object(&self.bucket, &self.key, body)
            .await
            .map_err(PipelineError::StorageWriteFailure)?;
        self.store
            .set_public_read(&self.bucket, &self.key)
            .await
            .map_err(PipelineError::StorageWriteFailure)?;

        info!(
            store = self.store.description(),
            bucket = %self.bucket,
            key = %self.key,
            bytes,
            machines = histogram.len(),
            "published usage histogram"
        );
        Ok(())
    }
}
