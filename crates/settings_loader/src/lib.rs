//! Environment-based settings for the sales digest job.
//!
//! A `.env` file in the working directory is honored when present;
//! required variables produce an error naming the variable.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_REPORTER_BASE_URL: &str =
    "https://reportingitc-reporter.apple.com/reportservice/sales/v1/";
const DEFAULT_RATES_BASE_URL: &str = "https://openexchangerates.org/api/";
const DEFAULT_ITUNES_BASE_URL: &str = "https://itunes.apple.com/";
const DEFAULT_CURSOR_FILE: &str = "data/last_report_date";

#[derive(Debug, Clone)]
pub struct Settings {
    pub reporter_base_url: String,
    pub reporter_access_token: String,
    pub vendor_id: String,
    pub rates_base_url: String,
    pub rates_app_id: String,
    pub itunes_base_url: String,
    pub slack_webhook_url: String,
    pub cursor_file: PathBuf,
}

impl Settings {
    /// Loads `.env` (if any) and reads every setting from the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            reporter_base_url: env_or("REPORTER_BASE_URL", DEFAULT_REPORTER_BASE_URL),
            reporter_access_token: required("REPORTER_ACCESS_TOKEN")?,
            vendor_id: required("APPSTORE_VENDOR_ID")?,
            rates_base_url: env_or("RATES_BASE_URL", DEFAULT_RATES_BASE_URL),
            rates_app_id: required("RATES_APP_ID")?,
            itunes_base_url: env_or("ITUNES_BASE_URL", DEFAULT_ITUNES_BASE_URL),
            slack_webhook_url: required("SLACK_WEBHOOK_URL")?,
            cursor_file: PathBuf::from(env_or("CURSOR_FILE", DEFAULT_CURSOR_FILE)),
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("Missing required environment variable {name}"))
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
