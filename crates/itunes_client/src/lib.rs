//! Catalog lookup of app title and icon artwork for a storefront country.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use models::AppMetadata;
use reqwest::{Client, Url};
use sales_pipeline::sources::MetadataSource;
use serde::Deserialize;
use tracing::debug;

pub struct ItunesClient {
    http: Client,
    base_url: Url,
}

impl ItunesClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid catalog base URL: {base_url}"))?;
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl MetadataSource for ItunesClient {
    async fn lookup(&self, app_id: &str, country: &str) -> Result<AppMetadata> {
        let endpoint = self
            .base_url
            .join("lookup")
            .context("Failed to build catalog lookup URL")?;

        debug!("GET {} id={} country={}", endpoint, app_id, country);
        let response: LookupResponse = self
            .http
            .get(endpoint.clone())
            .query(&[("id", app_id), ("country", country)])
            .send()
            .await
            .with_context(|| format!("GET {endpoint} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {endpoint} returned non-success status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse lookup JSON from {endpoint}"))?;

        let entry = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No catalog entry for app {} in storefront {}", app_id, country))?;

        Ok(AppMetadata {
            title: entry.track_name,
            icon_url: entry.artwork_url_100,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupEntry>,
}

#[derive(Debug, Deserialize)]
struct LookupEntry {
    #[serde(rename = "trackName")]
    track_name: String,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}
