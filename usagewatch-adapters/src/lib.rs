//! # usagewatch-adapters
//!
//! Adapters for the external services usagewatch talks to.
//!
//! Each concern is a trait so the pipeline can run against in-memory fakes:
//!
//! - [`HistoryApi`]: pages of channel history. [`slack::SlackClient`]
//!   (`slack` feature) talks to the Slack Web API.
//! - [`ObjectStore`]: object writes plus a public-read grant.
//!   [`FileObjectStore`] writes to a local directory;
//!   [`http_store::HttpObjectStore`] (`http-store` feature) speaks the
//!   S3-style REST API.
//! - [`FunctionRegistry`]: serverless function lookup, creation and code
//!   updates. [`lambda::HttpFunctionRegistry`] (`lambda` feature) speaks the
//!   Lambda-style REST API.
//!
//! ## Quick Start (Slack)
//!
//! ```rust,no_run
//! # #[cfg(feature = "slack")]
//! # async fn demo() -> Result<(), usagewatch_adapters::AdapterError> {
//! use usagewatch_adapters::slack::SlackClient;
//! use usagewatch_adapters::{HistoryApi, HistoryQuery};
//!
//! let client = SlackClient::builder().build()?;
//! let page = client
//!     .history(&HistoryQuery {
//!         token: "xoxb-...".to_string(),
//!         channel: "C0K5VBMPS".to_string(),
//!         oldest: 0.0,
//!         latest: 1_700_000_000.0,
//!         count: 100,
//!     })
//!     .await?;
//!
//! println!("{} messages, more: {}", page.messages.len(), page.has_more);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod functions;
pub mod history;
pub mod storage;

#[cfg(feature = "slack")]
pub mod slack;

#[cfg(feature = "http-store")]
pub mod http_store;

#[cfg(feature = "lambda")]
pub mod lambda;

pub use error::AdapterError;
pub use functions::{CodeLocation, FunctionRegistry, FunctionSpec};
pub use history::{HistoryApi, HistoryPage, HistoryQuery};
pub use storage::{FileObjectStore, ObjectStore};

// Re-export types for convenience
pub use usagewatch_types::Message;
