//! The end-to-end run: fetch, parse, sanitize, aggregate, publish.
//!
//! ```text
//! HistoryFetcher ──▶ EventParser ──▶ Sanitizer ──▶ Aggregator ──▶ Publisher
//!   (messages)        (events)      (alternating)   (histogram)    (JSON)
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;
use usagewatch_types::{Message, UsageHistogram};

use crate::aggregate::Aggregator;
use crate::fetch::{FetchOutcome, HistoryFetcher};
use crate::parse::{EventParser, ParseReport};
use crate::publish::Publisher;
use crate::sanitize::Sanitizer;
use crate::PipelineError;

/// Turns raw messages into a histogram, without any I/O.
#[derive(Debug, Clone)]
pub struct Summarizer {
    pub parser: EventParser,
    pub sanitizer: Sanitizer,
    pub aggregator: Aggregator,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self {
            parser: EventParser::default(),
            sanitizer: Sanitizer::default(),
            aggregator: Aggregator::new(6),
        }
    }
}

/// A histogram together with what parsing found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub histogram: UsageHistogram,
    pub report: ParseReport,
}

impl Summarizer {
    /// Summarize, stamping the histogram with the current time once built.
    pub fn summarize(&self, messages: &[Message]) -> Summary {
        let mut summary = self.summarize_at(messages, 0);
        summary.histogram.updated = unix_seconds();
        summary
    }

    /// Summarize with a fixed `updated` stamp.
    pub fn summarize_at(&self, messages: &[Message], updated: i64) -> Summary {
        let mut report = self.parser.parse(messages);
        let events = self.sanitizer.sanitize(std::mem::take(&mut report.events));
        let histogram = self.aggregator.aggregate(&events, updated);
        report.events = events;
        Summary { histogram, report }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The histogram was written.
    Published {
        messages: usize,
        machines: usize,
        unparseable: usize,
    },
    /// The history API returned nothing on every attempt; nothing was written.
    NoData,
}

/// The scheduled job.
#[derive(Debug)]
pub struct UsagePipeline {
    fetcher: HistoryFetcher,
    summarizer: Summarizer,
    publisher: Publisher,
}

impl UsagePipeline {
    pub fn new(fetcher: HistoryFetcher, summarizer: Summarizer, publisher: Publisher) -> Self {
        Self {
            fetcher,
            summarizer,
            publisher,
        }
    }

    /// Run once. Fetch and publish failures are returned; an empty history
    /// is a successful [`RunOutcome::NoData`].
    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let messages = match self.fetcher.fetch().await? {
            FetchOutcome::Messages(messages) => messages,
            FetchOutcome::NoData => {
                info!("no history available, skipping publish");
                return Ok(RunOutcome::NoData);
            }
        };

        let summary = self.summarizer.summarize(&messages);
        self.publisher.publish(&summary.histogram).await?;

        Ok(RunOutcome::Published {
            messages: messages.len(),
            machines: summary.histogram.len(),
            unparseable: summary.report.unparseable.len(),
        })
    }
}

fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
