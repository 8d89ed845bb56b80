//! Error types for the usage pipeline.

use std::path::PathBuf;

use thiserror::Error;
use usagewatch_adapters::AdapterError;

/// Failures that end a pipeline or deploy run.
///
/// Running out of history (no messages after every attempt) and
/// unparseable notifications are not errors; see
/// [`RunOutcome::NoData`](crate::RunOutcome::NoData) and
/// [`UnparseableEvent`](crate::UnparseableEvent).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required credential was not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// The history request failed in transport, status, or decoding.
    #[error("history request failed: {0}")]
    UpstreamRequestFailure(#[source] AdapterError),

    /// The history API answered with `ok: false`.
    #[error("history API returned error: {0}")]
    UpstreamApiError(String),

    /// Writing the histogram or its ACL failed.
    #[error("storage write failed: {0}")]
    StorageWriteFailure(#[source] AdapterError),

    /// The histogram could not be encoded.
    #[error("failed to encode histogram: {0}")]
    Encode(#[from] serde_json::Error),

    /// The deploy archive could not be read.
    #[error("failed to read archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A function descriptor is unusable.
    #[error("invalid function '{name}': {reason}")]
    InvalidFunction { name: String, reason: String },

    /// Uploading the archive or updating a function failed.
    #[error("deploy failed: {0}")]
    Deploy(#[source] AdapterError),
}

impl PipelineError {
    /// Classify a history adapter failure.
    pub fn upstream(err: AdapterError) -> Self {
        match err {
            AdapterError::Api(message) => PipelineError::UpstreamApiError(message),
            other => PipelineError::UpstreamRequestFailure(other),
        }
    }
}
