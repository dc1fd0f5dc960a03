//! File-backed persistence of the last successfully processed report date.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sales_pipeline::sources::CursorStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stores the cursor as a single `YYYY-MM-DD` line. An absent file means
/// no run has completed yet; unparseable content is fatal.
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn get(&self) -> Result<Option<NaiveDate>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Reading cursor file {}", self.path.display()));
            }
        };

        let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).with_context(|| {
            format!(
                "Cursor file {} holds an invalid date: '{}'",
                self.path.display(),
                raw.trim()
            )
        })?;
        Ok(Some(date))
    }

    async fn set(&self, date: NaiveDate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating cursor dir {}", parent.display()))?;
            }
        }
        fs::write(&self.path, format!("{}\n", date.format(DATE_FORMAT)))
            .with_context(|| format!("Writing cursor file {}", self.path.display()))?;
        Ok(())
    }
}
