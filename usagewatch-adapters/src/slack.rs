//! Slack adapter using the Web API `channels.history` method.
//!
//! Each request returns up to `count` messages (newest first) between
//! `oldest` and `latest`, plus a `has_more` flag when older messages remain.
//!
//! ## Example
//!
//! ```rust,no_run
//! use usagewatch_adapters::slack::SlackClient;
//! use usagewatch_adapters::{HistoryApi, HistoryQuery};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SlackClient::builder()
//!         .api_base("https://slack.com/api")
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     let query = HistoryQuery {
//!         token: std::env::var("SLACK_BOT_TOKEN")?,
//!         channel: "C0K5VBMPS".to_string(),
//!         oldest: 0.0,
//!         latest: 1_700_000_000.0,
//!         count: 100,
//!     };
//!
//!     for message in client.history(&query).await?.messages {
//!         println!("{}: {}", message.timestamp, message.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use usagewatch_types::Message;

use crate::error::check_status;
use crate::{AdapterError, HistoryApi, HistoryPage, HistoryQuery};

/// Slack Web API client for channel history.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    api_base: String,
}

impl SlackClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> SlackClientBuilder {
        SlackClientBuilder::default()
    }

    fn history_url(&self) -> String {
        format!("{}/channels.history", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl HistoryApi for SlackClient {
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, AdapterError> {
        let url = self.history_url();
        debug!(channel = %query.channel, oldest = query.oldest, latest = query.latest, "requesting history page");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("token", query.token.clone()),
                ("channel", query.channel.clone()),
                ("oldest", query.oldest.to_string()),
                ("latest", query.latest.to_string()),
                ("count", query.count.to_string()),
            ])
            .send()
            .await?;

        check_status(response.status())?;

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        body.into_page()
    }
}

/// Builder for SlackClient.
#[derive(Debug, Default)]
pub struct SlackClientBuilder {
    api_base: Option<String>,
    timeout: Option<Duration>,
}

impl SlackClientBuilder {
    /// Set the Web API base URL (default: "https://slack.com/api").
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<SlackClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let client = Client::builder().timeout(timeout).build()?;

        Ok(SlackClient {
            client,
            api_base: self
                .api_base
                .unwrap_or_else(|| "https://slack.com/api".to_string()),
        })
    }
}

/// Parse a saved `channels.history` response body into its messages.
///
/// Useful for replaying an exported history file offline.
pub fn parse_history(json: &str) -> Result<HistoryPage, AdapterError> {
    let body: HistoryResponse =
        serde_json::from_str(json).map_err(|e| AdapterError::Parse(e.to_string()))?;
    body.into_page()
}

/// Response body of `channels.history`.
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

impl HistoryResponse {
    fn into_page(self) -> Result<HistoryPage, AdapterError> {
        if !self.ok {
            return Err(AdapterError::Api(
                self.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        let messages = self
            .messages
            .into_iter()
            .map(RawMessage::into_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoryPage {
            messages,
            has_more: self.has_more,
        })
    }
}

/// A message as Slack encodes it: the timestamp is a decimal string.
#[derive(Debug, Deserialize)]
struct RawMessage {
    ts: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    username: Option<String>,
}

impl RawMessage {
    fn into_message(self) -> Result<Message, AdapterError> {
        let timestamp = self
            .ts
            .parse::<f64>()
            .map_err(|_| AdapterError::Parse(format!("invalid message timestamp '{}'", self.ts)))?;

        Ok(Message {
            sender_name: self.username,
            text: self.text,
            timestamp,
        })
    }
}
