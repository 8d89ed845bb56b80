//! # usagewatch
//!
//! Builds an hour-of-week occupancy histogram for shared workshop machines
//! from the status notifications a webhook posts into a chat channel, and
//! publishes it as a small public JSON file.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          UsagePipeline                            │
//! │  ┌─────────┐   ┌────────┐   ┌──────────┐   ┌───────────┐  ┌─────┐ │
//! │  │  fetch  │──▶│ parse  │──▶│ sanitize │──▶│ aggregate │─▶│ pub │ │
//! │  └────┬────┘   └────────┘   └──────────┘   └───────────┘  └──┬──┘ │
//! │       │                                                      │    │
//! │       ▼                                                      ▼    │
//! │   HistoryApi                                          ObjectStore │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`fetch`]**: pages through the channel history for the lookback window
//! - **[`parse`]**: turns notifier messages into per-machine [`Event`]s
//! - **[`sanitize`]**: sorts, shifts to local time, and forces alternation
//! - **[`aggregate`]**: splits usage intervals into hour buckets and normalizes
//! - **[`publish`]**: writes the histogram with public read access
//! - **[`deploy`]**: uploads a code archive and creates or updates functions
//!
//! The network and storage edges live in `usagewatch-adapters`, so every
//! stage here can be driven by in-memory fakes.
//!
//! ## Usage
//!
//! ```bash
//! SLACK_BOT_TOKEN=xoxb-... usagewatch run
//! usagewatch --config usagewatch.toml deploy --archive target/lambda.zip
//! usagewatch summarize --input history.json
//! ```
//!
//! ## Output
//!
//! ```json
//! {
//!   "Laser Cutter": { "Monday": [0.0, 0.0, ...], ..., "Sunday": [...] },
//!   "updated": 1700000000
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod deploy;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod parse;
pub mod pipeline;
pub mod publish;
pub mod sanitize;

#[cfg(test)]
mod test_support;

pub use aggregate::Aggregator;
pub use config::Settings;
pub use deploy::{DeployAction, Deployer};
pub use error::PipelineError;
pub use fetch::{FetchOptions, FetchOutcome, HistoryFetcher};
pub use parse::{EventParser, ParseReport, UnparseableEvent};
pub use pipeline::{RunOutcome, Summarizer, Summary, UsagePipeline};
pub use publish::Publisher;
pub use sanitize::Sanitizer;

pub use usagewatch_types::{Event, Interval, Message, Status, UsageHistogram, Weekday, WeeklyUsage};
