//! Client for the exchange-rate service. Rates are quoted as units of a
//! currency per 1 USD, exactly what the report parser divides by.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use sales_pipeline::sources::RateSource;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RatesConfig {
    pub base_url: String,
    pub app_id: String,
}

pub struct RatesClient {
    http: Client,
    base_url: Url,
    app_id: String,
}

impl RatesClient {
    pub fn new(config: RatesConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid rates base URL: {}", config.base_url))?;
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            app_id: config.app_id,
        })
    }
}

#[async_trait]
impl RateSource for RatesClient {
    async fn rates(&self) -> Result<HashMap<String, f64>> {
        let endpoint = self
            .base_url
            .join("latest.json")
            .context("Failed to build rates URL")?;

        debug!("GET {}", endpoint);
        let response: RatesResponse = self
            .http
            .get(endpoint.clone())
            .query(&[("app_id", self.app_id.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {endpoint} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {endpoint} returned non-success status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse rates JSON from {endpoint}"))?;

        Ok(response.rates)
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_response_shape() {
        let parsed: RatesResponse = serde_json::from_str(
            r#"{"base": "USD", "rates": {"USD": 1.0, "EUR": 0.91, "JPY": 148.2}}"#,
        )
        .unwrap();
        assert_eq!(parsed.rates.len(), 3);
        assert_eq!(parsed.rates.get("JPY"), Some(&148.2));
    }

    #[test]
    fn test_rates_response_requires_rates_field() {
        assert!(serde_json::from_str::<RatesResponse>(r#"{"base": "USD"}"#).is_err());
    }
}
