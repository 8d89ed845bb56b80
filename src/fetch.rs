//! Paged history retrieval with anomaly tolerance and whole-fetch retries.
//!
//! The history API returns pages newest-first. While a page reports
//! `has_more`, the next request's `latest` bound moves to the oldest
//! timestamp seen so far, walking the window backward until it is drained.
//!
//! Two upstream quirks are tolerated:
//!
//! - a page with no messages that still claims `has_more`. The same window
//!   is re-requested up to [`FetchOptions::max_empty_pages`] times in a row
//!   before pagination gives up.
//! - a fetch that returns nothing at all. The whole fetch is repeated up to
//!   [`FetchOptions::max_attempts`] times, [`FetchOptions::retry_delay`]
//!   apart.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};
use usagewatch_adapters::{HistoryApi, HistoryQuery};
use usagewatch_types::Message;

use crate::PipelineError;

/// Seconds in one week.
pub const SECONDS_PER_WEEK: f64 = 7.0 * 86_400.0;

/// Tuning for [`HistoryFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Channel to read.
    pub channel: String,
    /// Lookback window in whole weeks.
    pub weeks: u32,
    /// Messages requested per page.
    pub page_size: u32,
    /// Consecutive empty `has_more` pages tolerated before giving up.
    pub max_empty_pages: u32,
    /// Whole-fetch attempts before reporting no data.
    pub max_attempts: u32,
    /// Pause between whole-fetch attempts.
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            channel: "C0K5VBMPS".to_string(),
            weeks: 6,
            page_size: 100,
            max_empty_pages: 10,
            max_attempts: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl FetchOptions {
    /// Length of the lookback window in seconds, at least one week.
    pub fn window_secs(&self) -> f64 {
        f64::from(self.weeks.max(1)) * SECONDS_PER_WEEK
    }
}

/// Result of a complete fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Messages in arrival order (newest first).
    Messages(Vec<Message>),
    /// Every attempt came back empty.
    NoData,
}

/// Pulls the full lookback window of channel history.
#[derive(Debug)]
pub struct HistoryFetcher {
    api: Box<dyn HistoryApi>,
    token: Option<String>,
    options: FetchOptions,
}

impl HistoryFetcher {
    /// Create a fetcher. The token is checked when [`fetch`](Self::fetch)
    /// runs, before any request is made.
    pub fn new(api: Box<dyn HistoryApi>, token: Option<String>, options: FetchOptions) -> Self {
        Self {
            api,
            token,
            options,
        }
    }

    /// Returns the fetch options.
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch the window ending now, retrying whole fetches that return nothing.
    pub async fn fetch(&self) -> Result<FetchOutcome, PipelineError> {
        let token = self.token()?;
        let attempts = self.options.max_attempts.max(1);

        for attempt in 1..=attempts {
            let messages = self.fetch_window(token, unix_now()).await?;
            if !messages.is_empty() {
                info!(attempt, total = messages.len(), "fetched channel history");
                return Ok(FetchOutcome::Messages(messages));
            }

            warn!(attempt, attempts, "history fetch returned no messages");
            if attempt < attempts {
                tokio::time::sleep(self.options.retry_delay).await;
            }
        }

        warn!(attempts, "no messages returned from history API");
        Ok(FetchOutcome::NoData)
    }

    /// Page through `[latest - window, latest]` once.
    pub async fn fetch_window(&self, token: &str, latest: f64) -> Result<Vec<Message>, PipelineError> {
        let oldest = latest - self.options.window_secs();
        let mut query = HistoryQuery {
            token: token.to_string(),
            channel: self.options.channel.clone(),
            oldest,
            latest,
            count: self.options.page_size,
        };

        let mut messages = Vec::new();
        let mut empty_pages = 0u32;
        let mut page_number = 0u32;

        loop {
            page_number += 1;
            let page = self
                .api
                .history(&query)
                .await
                .map_err(PipelineError::upstream)?;

            let Some(last) = page.messages.last() else {
                if !page.has_more {
                    break;
                }
                empty_pages += 1;
                if empty_pages > self.options.max_empty_pages {
                    warn!(empty_pages, "too many empty pages, treating history as exhausted");
                    break;
                }
                warn!(empty_pages, latest = query.latest, "empty page with has_more set, retrying");
                continue;
            };

            empty_pages = 0;
            let next_latest = last.timestamp;
            let has_more = page.has_more;
            messages.extend(page.messages);

            debug!(page = page_number, total = messages.len(), has_more, "received history page");

            if !has_more {
                break;
            }
            query.latest = next_latest;
        }

        Ok(messages)
    }

    fn token(&self) -> Result<&str, PipelineError> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(PipelineError::MissingCredential("chat access token")),
        }
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
