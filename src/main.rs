use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use usagewatch::config::{Settings, StorageBackend};
use usagewatch::logging::{init_logging, LogFormat};
use usagewatch::{
    DeployAction, Deployer, HistoryFetcher, Publisher, RunOutcome, UsagePipeline,
};
use usagewatch_adapters::http_store::HttpObjectStore;
use usagewatch_adapters::lambda::HttpFunctionRegistry;
use usagewatch_adapters::slack::{parse_history, SlackClient};
use usagewatch_adapters::{FileObjectStore, ObjectStore};

#[derive(Parser, Debug)]
#[command(name = "usagewatch", version)]
#[command(about = "Publishes an hour-of-week machine usage histogram built from chat notifications")]
struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch channel history, rebuild the histogram and publish it
    Run,

    /// Upload a code archive and create or update the configured functions
    Deploy {
        /// Packaged build archive to upload
        #[arg(short, long)]
        archive: PathBuf,
    },

    /// Build a histogram from a saved history response without publishing
    Summarize {
        /// JSON body of a channels.history response
        #[arg(short, long)]
        input: PathBuf,

        /// Write the histogram here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Command::Run => run(&settings).await,
        Command::Deploy { archive } => deploy(&settings, &archive).await,
        Command::Summarize { input, output } => summarize(&settings, &input, output.as_deref()).await,
    }
}

async fn run(settings: &Settings) -> Result<()> {
    let client = SlackClient::builder()
        .api_base(settings.slack.api_base.clone())
        .timeout(settings.slack_timeout())
        .build()?;
    let fetcher = HistoryFetcher::new(
        Box::new(client),
        settings.slack.token.clone(),
        settings.fetch_options(),
    );
    let publisher = Publisher::new(
        object_store(settings)?,
        settings.storage.bucket.clone(),
        settings.storage.key.clone(),
    );

    let pipeline = UsagePipeline::new(fetcher, settings.summarizer(), publisher);
    match pipeline.run().await? {
        RunOutcome::Published {
            messages,
            machines,
            unparseable,
        } => info!(messages, machines, unparseable, "histogram published"),
        RunOutcome::NoData => info!("nothing published"),
    }

    Ok(())
}

async fn deploy(settings: &Settings, archive: &Path) -> Result<()> {
    let mut registry = HttpFunctionRegistry::builder();
    if let Some(endpoint) = &settings.deploy.endpoint {
        registry = registry.endpoint(endpoint.clone());
    }
    if let Some(token) = &settings.deploy.bearer_token {
        registry = registry.bearer_token(token.clone());
    }

    let deployer = Deployer::new(
        object_store(settings)?,
        Box::new(registry.build()?),
        settings.code_location(),
    );

    for action in deployer.deploy(archive, &settings.deploy.functions).await? {
        match action {
            DeployAction::Created(name) => info!(function = %name, "created function"),
            DeployAction::Updated(name) => info!(function = %name, "updated function code"),
        }
    }

    Ok(())
}

async fn summarize(settings: &Settings, input: &Path, output: Option<&Path>) -> Result<()> {
    let body = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let page = parse_history(&body)?;

    let summary = settings.summarizer().summarize(&page.messages);
    info!(
        messages = page.messages.len(),
        machines = summary.histogram.len(),
        unparseable = summary.report.unparseable.len(),
        "summarized history"
    );

    let json = serde_json::to_string_pretty(&summary.histogram)?;
    match output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(())
}

fn object_store(settings: &Settings) -> Result<Box<dyn ObjectStore>> {
    let storage = &settings.storage;
    match storage.backend {
        StorageBackend::File => Ok(Box::new(FileObjectStore::new(&storage.root))),
        StorageBackend::Http => {
            let mut builder = HttpObjectStore::builder();
            if let Some(endpoint) = &storage.endpoint {
                builder = builder.endpoint(endpoint.clone());
            }
            if let Some(token) = &storage.bearer_token {
                builder = builder.bearer_token(token.clone());
            }
            Ok(Box::new(builder.build()?))
        }
    }
}
