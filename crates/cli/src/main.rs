//! `sales-digest`: fetch the daily sales report, build the comparison
//! digest and post it to Slack.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use appstore_client::{ReporterClient, ReporterConfig};
use cursor_store::FileCursorStore;
use itunes_client::ItunesClient;
use models::DisplayMessage;
use rates_client::{RatesClient, RatesConfig};
use sales_pipeline::coordinator::{DigestRun, RunOutcome};
use sales_pipeline::sources::{CursorStore, DeliverySink};
use settings_loader::Settings;
use slack_client::SlackClient;

#[derive(Parser, Debug)]
#[command(
    name = "sales-digest",
    about = "Fetch the daily App Store sales report and post the digest to Slack."
)]
struct Args {
    /// Path to a .env file to load before reading settings
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Print the digest to stdout instead of posting, leaving the cursor alone
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Some(path) = &args.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("Loading env file {}", path.display()))?;
    }
    let settings = Settings::load()?;

    let reports = ReporterClient::new(ReporterConfig {
        base_url: settings.reporter_base_url.clone(),
        access_token: settings.reporter_access_token.clone(),
        vendor_id: settings.vendor_id.clone(),
    })?;
    let rates = RatesClient::new(RatesConfig {
        base_url: settings.rates_base_url.clone(),
        app_id: settings.rates_app_id.clone(),
    })?;
    let metadata = ItunesClient::new(&settings.itunes_base_url)?;
    let slack = SlackClient::new(&settings.slack_webhook_url)?;
    let file_cursor = FileCursorStore::new(&settings.cursor_file);

    let stdout_sink = StdoutSink;
    let frozen_cursor = FrozenCursor {
        inner: &file_cursor,
    };

    let run = if args.dry_run {
        info!("dry run: digest goes to stdout, cursor stays put");
        DigestRun {
            reports: &reports,
            rates: &rates,
            metadata: &metadata,
            cursor: &frozen_cursor,
            sink: &stdout_sink,
        }
    } else {
        DigestRun {
            reports: &reports,
            rates: &rates,
            metadata: &metadata,
            cursor: &file_cursor,
            sink: &slack,
        }
    };

    match run.run().await? {
        RunOutcome::Delivered { date, apps } => {
            info!("digest for {} delivered ({} apps)", date, apps);
        }
        RunOutcome::NotReady { date } => {
            info!("report for {} not ready, nothing delivered", date);
        }
    }
    Ok(())
}

/// Dry-run sink: prints the digest JSON instead of posting it.
struct StdoutSink;

#[async_trait]
impl DeliverySink for StdoutSink {
    async fn send(&self, message: &DisplayMessage) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(message)?);
        Ok(())
    }
}

/// Dry-run cursor: reads through to the real store but never writes, so a
/// real run can process the same date again.
struct FrozenCursor<'a> {
    inner: &'a FileCursorStore,
}

#[async_trait]
impl CursorStore for FrozenCursor<'_> {
    async fn get(&self) -> Result<Option<NaiveDate>> {
        self.inner.get().await
    }

    async fn set(&self, _date: NaiveDate) -> Result<()> {
        Ok(())
    }
}
