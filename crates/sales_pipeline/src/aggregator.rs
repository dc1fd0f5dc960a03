//! Builds the three-way comparison dataset for one target date.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use models::{AppSalesRecord, ReportAvailability, SalesSnapshot};
use report_parser::parse_report;
use tracing::debug;

use crate::rates::with_usd_anchor;
use crate::sources::{RateSource, ReportSource};

pub struct SalesAggregator<'a> {
    reports: &'a dyn ReportSource,
    rates: &'a dyn RateSource,
}

impl<'a> SalesAggregator<'a> {
    pub fn new(reports: &'a dyn ReportSource, rates: &'a dyn RateSource) -> Self {
        Self { reports, rates }
    }

    /// Returns `None` when the target-date report is not published yet,
    /// which tells the caller to try again on the next scheduled run.
    ///
    /// A published-but-empty day still returns a full snapshot (with the
    /// comparison maps left empty and never fetched).
    pub async fn aggregate(&self, target: NaiveDate) -> Result<Option<SalesSnapshot>> {
        let day_rows = match self.reports.daily_report(target).await? {
            ReportAvailability::NotYetPublished => {
                debug!("report for {} not published yet", target);
                return Ok(None);
            }
            ReportAvailability::NoSales => Vec::new(),
            ReportAvailability::Available(rows) => rows,
        };

        let rate_table = with_usd_anchor(self.rates.rates().await?);

        let mut snapshot = SalesSnapshot {
            day: parse_report(&day_rows, &rate_table)?,
            ..Default::default()
        };
        if snapshot.day.is_empty() {
            return Ok(Some(snapshot));
        }

        // The day's rate table is reused for both comparison dates so one
        // run never mixes exchange rates.
        let prev_day = target - Days::new(1);
        let prev_week = target - Days::new(7);
        snapshot.prev_day = self.comparison_report(prev_day, &rate_table).await?;
        snapshot.prev_week = self.comparison_report(prev_week, &rate_table).await?;

        Ok(Some(snapshot))
    }

    /// Comparison dates degrade to an empty map when no comparable report
    /// exists; that is a zero baseline, not an error.
    async fn comparison_report(
        &self,
        date: NaiveDate,
        rate_table: &HashMap<String, f64>,
    ) -> Result<HashMap<String, AppSalesRecord>> {
        let rows = match self.reports.daily_report(date).await? {
            ReportAvailability::Available(rows) => rows,
            ReportAvailability::NotYetPublished | ReportAvailability::NoSales => {
                return Ok(HashMap::new());
            }
        };
        Ok(parse_report(&rows, rate_table)?)
    }
}
