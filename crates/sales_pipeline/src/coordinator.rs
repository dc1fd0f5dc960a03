//! Sequencing for one scheduled digest run: status check, target date,
//! aggregation, icon enrichment, delivery, cursor advance. Every fatal
//! error aborts before the cursor moves, so a failed date is retried on
//! the next run.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate, Utc};
use models::AppSalesRecord;
use tracing::info;

use crate::aggregator::SalesAggregator;
use crate::formatter::build_message;
use crate::sources::{CursorStore, DeliverySink, MetadataSource, RateSource, ReportSource};

/// Days the provider lags behind when publishing a daily report; a first
/// run (no cursor yet) starts this far in the past.
const PUBLICATION_LAG_DAYS: u64 = 2;

/// How a run ended. Both variants are successful terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Digest delivered and cursor advanced.
    Delivered { date: NaiveDate, apps: usize },
    /// The report is not published yet; nothing sent, cursor untouched.
    NotReady { date: NaiveDate },
}

/// One digest run over the five collaborators.
pub struct DigestRun<'a> {
    pub reports: &'a dyn ReportSource,
    pub rates: &'a dyn RateSource,
    pub metadata: &'a dyn MetadataSource,
    pub cursor: &'a dyn CursorStore,
    pub sink: &'a dyn DeliverySink,
}

impl DigestRun<'_> {
    pub async fn run(&self) -> Result<RunOutcome> {
        let status = self
            .reports
            .status()
            .await
            .context("report service status check failed")?;
        if status.trim().is_empty() {
            bail!("report service returned an empty status message");
        }
        info!("report service status: {}", status.trim());

        let target = self.target_date().await?;

        let aggregator = SalesAggregator::new(self.reports, self.rates);
        let Some(mut snapshot) = aggregator.aggregate(target).await? else {
            info!("report for {} not ready, skipping this run", target);
            return Ok(RunOutcome::NotReady { date: target });
        };

        self.enrich_icons(&mut snapshot.day).await?;

        let message = build_message(&snapshot, target);
        self.sink
            .send(&message)
            .await
            .context("delivering digest failed")?;

        // Reached only after a successful send; an empty-sales day is a
        // validly processed day and advances the cursor too.
        self.cursor
            .set(target)
            .await
            .context("advancing report cursor failed")?;

        Ok(RunOutcome::Delivered {
            date: target,
            apps: snapshot.day.len(),
        })
    }

    async fn target_date(&self) -> Result<NaiveDate> {
        let target = match self
            .cursor
            .get()
            .await
            .context("reading report cursor failed")?
        {
            Some(last) => last + Days::new(1),
            None => Utc::now().date_naive() - Days::new(PUBLICATION_LAG_DAYS),
        };
        Ok(target)
    }

    /// One catalog lookup per app in the day snapshot. Any failure is fatal
    /// so a digest never goes out half-enriched.
    async fn enrich_icons(&self, day: &mut HashMap<String, AppSalesRecord>) -> Result<()> {
        let mut app_ids: Vec<String> = day.keys().cloned().collect();
        app_ids.sort();

        for app_id in app_ids {
            let country = day[&app_id].country.clone();
            let meta = self
                .metadata
                .lookup(&app_id, &country)
                .await
                .with_context(|| format!("metadata lookup for app {} failed", app_id))?;
            if let Some(record) = day.get_mut(&app_id) {
                record.icon_url = meta.icon_url;
            }
        }
        Ok(())
    }
}
