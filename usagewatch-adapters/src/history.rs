//! Channel history abstraction.

use std::fmt::Debug;

use async_trait::async_trait;
use usagewatch_types::Message;

use crate::AdapterError;

/// Parameters for one page of channel history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    /// Access token sent with the request.
    pub token: String,
    /// Channel identifier.
    pub channel: String,
    /// Start of the time window (Unix seconds, inclusive).
    pub oldest: f64,
    /// End of the time window (Unix seconds).
    pub latest: f64,
    /// Maximum number of messages per page.
    pub count: u32,
}

/// One page of channel history, newest message first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryPage {
    pub messages: Vec<Message>,
    /// Whether older messages remain in the window.
    pub has_more: bool,
}

/// Source of paged channel history.
///
/// Implementations report an API-level failure (`ok: false`) as
/// [`AdapterError::Api`] and transport or status failures as the other
/// variants.
#[async_trait]
pub trait HistoryApi: Send + Sync + Debug {
    /// Fetch a single page for the given window.
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, AdapterError>;
}
