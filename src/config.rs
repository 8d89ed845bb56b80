//! Layered settings for the `usagewatch` binary.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file passed with `--config`
//! 3. `USAGEWATCH__<SECTION>__<KEY>` environment variables
//! 4. `SLACK_BOT_TOKEN` for the chat access token
//!
//! ```toml
//! [slack]
//! channel = "C0K5VBMPS"
//! weeks = 6
//!
//! [storage]
//! backend = "file"
//! root = "/var/lib/usagewatch"
//!
//! [[deploy.functions]]
//! name = "tinker-access-stats"
//! handler = "bootstrap"
//! runtime = "provided.al2023"
//! role = "arn:aws:iam::123456789012:role/usagewatch"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use usagewatch_adapters::{CodeLocation, FunctionSpec};

use crate::aggregate::Aggregator;
use crate::fetch::FetchOptions;
use crate::parse::{EventParser, DEFAULT_NOTIFIER};
use crate::pipeline::Summarizer;
use crate::publish::{DEFAULT_BUCKET, DEFAULT_KEY};
use crate::sanitize::{Sanitizer, DEFAULT_UTC_OFFSET_HOURS};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "USAGEWATCH";

/// Environment variable holding the chat access token.
pub const TOKEN_ENV: &str = "SLACK_BOT_TOKEN";

/// All runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub slack: SlackSettings,
    pub aggregate: AggregateSettings,
    pub storage: StorageSettings,
    pub deploy: DeploySettings,
}

/// Chat history source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlackSettings {
    pub api_base: String,
    pub token: Option<String>,
    pub channel: String,
    pub notifier: String,
    pub weeks: u32,
    pub page_size: u32,
    pub max_empty_pages: u32,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for SlackSettings {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            api_base: "https://slack.com/api".to_string(),
            token: None,
            channel: fetch.channel,
            notifier: DEFAULT_NOTIFIER.to_string(),
            weeks: fetch.weeks,
            page_size: fetch.page_size,
            max_empty_pages: fetch.max_empty_pages,
            max_attempts: fetch.max_attempts,
            retry_delay_ms: fetch.retry_delay.as_millis() as u64,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregateSettings {
    /// Fixed shift from UTC applied before bucketing.
    pub utc_offset_hours: i32,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

/// Which [`ObjectStore`](usagewatch_adapters::ObjectStore) to write through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-style REST; needs `storage.endpoint`.
    Http,
    #[default]
    File,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Base URL for the HTTP backend, required when it is selected.
    pub endpoint: Option<String>,
    pub bearer_token: Option<String>,
    /// Directory for the file backend.
    pub root: PathBuf,
    pub bucket: String,
    pub key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            endpoint: None,
            bearer_token: None,
            root: PathBuf::from("."),
            bucket: DEFAULT_BUCKET.to_string(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    /// Base URL of the function registry, required to deploy.
    pub endpoint: Option<String>,
    pub bearer_token: Option<String>,
    /// Key the code archive is uploaded under, in the storage bucket.
    pub archive_key: String,
    pub functions: Vec<FunctionSpec>,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            bearer_token: None,
            archive_key: "tinker_access.zip".to_string(),
            functions: vec![FunctionSpec {
                name: "tinker-access-stats".to_string(),
                handler: "bootstrap".to_string(),
                runtime: "provided.al2023".to_string(),
                role: String::new(),
            }],
        }
    }
}

impl Settings {
    /// Load settings from an optional file, the process environment and
    /// `SLACK_BOT_TOKEN`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(
            path,
            Environment::with_prefix(ENV_PREFIX),
            std::env::var(TOKEN_ENV).ok(),
        )
    }

    /// Load settings with an explicit environment source and token.
    pub fn load_from(
        path: Option<&Path>,
        env: Environment,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(env.prefix_separator("__").separator("__").try_parsing(true))
            .set_override_option("slack.token", token.filter(|t| !t.is_empty()))?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations that cannot work at run time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_endpoint = self
            .storage
            .endpoint
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());
        if self.storage.backend == StorageBackend::Http && !has_endpoint {
            return Err(ConfigError::Message(
                "storage.endpoint is required when storage.backend is \"http\"".to_string(),
            ));
        }
        Ok(())
    }

    /// Pagination and retry tuning for the fetcher.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            channel: self.slack.channel.clone(),
            weeks: self.slack.weeks.max(1),
            page_size: self.slack.page_size,
            max_empty_pages: self.slack.max_empty_pages,
            max_attempts: self.slack.max_attempts,
            retry_delay: Duration::from_millis(self.slack.retry_delay_ms),
        }
    }

    /// Parser, sanitizer and aggregator configured from these settings.
    pub fn summarizer(&self) -> Summarizer {
        Summarizer {
            parser: EventParser::new(self.slack.notifier.clone()),
            sanitizer: Sanitizer::new(self.aggregate.utc_offset_hours),
            aggregator: Aggregator::new(self.fetch_options().weeks),
        }
    }

    /// HTTP timeout for the chat API.
    pub fn slack_timeout(&self) -> Duration {
        Duration::from_secs(self.slack.timeout_secs)
    }

    /// Where the deploy archive is uploaded.
    pub fn code_location(&self) -> CodeLocation {
        CodeLocation {
            bucket: self.storage.bucket.clone(),
            key: self.deploy.archive_key.clone(),
        }
    }
}
