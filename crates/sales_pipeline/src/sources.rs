//! Collaborator contracts the pipeline consumes. Implementations live in
//! the client crates; tests use scripted stand-ins.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use models::{AppMetadata, DisplayMessage, ReportAvailability};

/// Daily sales report feed.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Availability message of the report service; an unreachable or broken
    /// service surfaces here as an error.
    async fn status(&self) -> Result<String>;

    /// Fetches the report for one date.
    async fn daily_report(&self, date: NaiveDate) -> Result<ReportAvailability>;
}

/// Exchange-rate feed: currency code -> units of that currency per 1 USD.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn rates(&self) -> Result<HashMap<String, f64>>;
}

/// Catalog metadata lookup for an app + storefront country pair.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(&self, app_id: &str, country: &str) -> Result<AppMetadata>;
}

/// Durable store of the last successfully processed report date.
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn get(&self) -> Result<Option<NaiveDate>>;
    async fn set(&self, date: NaiveDate) -> Result<()>;
}

/// Outbound channel the finished digest is posted to.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send(&self, message: &DisplayMessage) -> Result<()>;
}
