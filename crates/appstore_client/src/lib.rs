//! Client for the sales report service: availability status plus the
//! tab-separated daily report feed.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use models::ReportAvailability;
use reqwest::{Client, Url};
use sales_pipeline::sources::ReportSource;
use serde::Deserialize;
use tracing::debug;

/// Error code the service answers with while a report is still generating.
const CODE_NOT_PUBLISHED: i64 = 210;
/// Error code for a date with no units sold at all.
const CODE_NO_SALES: i64 = 213;

#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub base_url: String,
    pub access_token: String,
    pub vendor_id: String,
}

pub struct ReporterClient {
    http: Client,
    base_url: Url,
    access_token: String,
    vendor_id: String,
}

impl ReporterClient {
    pub fn new(config: ReporterConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid reporter base URL: {}", config.base_url))?;
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token,
            vendor_id: config.vendor_id,
        })
    }
}

#[async_trait]
impl ReportSource for ReporterClient {
    async fn status(&self) -> Result<String> {
        let endpoint = self
            .base_url
            .join("status")
            .context("Failed to build reporter status URL")?;

        debug!("GET {}", endpoint);
        let response: StatusResponse = self
            .http
            .get(endpoint.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("GET {endpoint} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {endpoint} returned non-success status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse status JSON from {endpoint}"))?;

        Ok(response.message)
    }

    async fn daily_report(&self, date: NaiveDate) -> Result<ReportAvailability> {
        let endpoint = self
            .base_url
            .join("sales")
            .context("Failed to build reporter sales URL")?;
        let report_date = date.format("%Y%m%d").to_string();

        debug!("GET {} reportDate={}", endpoint, report_date);
        let response = self
            .http
            .get(endpoint.clone())
            .bearer_auth(&self.access_token)
            .query(&[
                ("vendorNumber", self.vendor_id.as_str()),
                ("reportDate", report_date.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("GET {endpoint} failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read report body from {endpoint}"))?;

        if !status.is_success() {
            if let Some(availability) = classify_error_body(&body) {
                return Ok(availability);
            }
            bail!("GET {} returned {}: {}", endpoint, status, body.trim());
        }

        if body.trim().is_empty() {
            return Ok(ReportAvailability::NoSales);
        }
        Ok(ReportAvailability::Available(split_rows(&body)?))
    }
}

/// The service flags an unavailable report through a JSON error body; only
/// the two known codes are benign, everything else stays an error.
fn classify_error_body(body: &str) -> Option<ReportAvailability> {
    let error: ServiceError = serde_json::from_str(body).ok()?;
    match error.code {
        CODE_NOT_PUBLISHED => {
            debug!("report not published: {}", error.message);
            Some(ReportAvailability::NotYetPublished)
        }
        CODE_NO_SALES => {
            debug!("no sales: {}", error.message);
            Some(ReportAvailability::NoSales)
        }
        _ => None,
    }
}

/// Splits the tab-separated report body into raw rows, header first. The
/// feed is unquoted, so quoting is off and ragged rows are tolerated.
fn split_rows(body: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read report row")?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    code: i64,
    #[serde(default)]
    message: String,
}
