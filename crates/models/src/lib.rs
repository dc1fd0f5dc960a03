use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw report row: ordered string cells as delivered by the feed.
pub type RawRow = Vec<String>;

/// Outcome of fetching one daily report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportAvailability {
    /// Report body, header row first.
    Available(Vec<RawRow>),
    /// The provider has not generated this report yet.
    NotYetPublished,
    /// The report exists but holds zero data rows.
    NoSales,
}

/// Classification of a report row by its product type identifier.
///
/// Install and in-app rows both carry revenue; only install rows count
/// towards the download figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductTypeClass {
    Install,
    InAppPurchase,
    Other,
}

impl ProductTypeClass {
    /// Fixed lookup table over the feed's product type identifiers.
    pub fn classify(product_type_id: &str) -> Self {
        match product_type_id.trim() {
            "1" | "1F" | "1T" | "F1" | "1E" | "1EP" | "1EU" => Self::Install,
            "IA1" | "IA9" | "IAY" | "IAC" | "FI1" => Self::InAppPurchase,
            _ => Self::Other,
        }
    }

    pub fn counts_installs(self) -> bool {
        matches!(self, Self::Install)
    }

    pub fn counts_revenue(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Per-app aggregate for one report day. Revenue is normalized to USD and
/// may be fractional; the icon is filled in by the metadata enrichment step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSalesRecord {
    pub title: String,
    pub country: String,
    pub icon_url: Option<String>,
    pub installs: u64,
    pub revenue: f64,
}

impl AppSalesRecord {
    /// Stub record as created on first sight of an app identifier.
    pub fn stub(title: &str, country: &str) -> Self {
        Self {
            title: title.to_string(),
            country: country.to_string(),
            ..Self::default()
        }
    }
}

/// The three parsed per-app maps one comparison run works on. Apps missing
/// from `prev_day`/`prev_week` read as a zero baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesSnapshot {
    pub day: HashMap<String, AppSalesRecord>,
    pub prev_day: HashMap<String, AppSalesRecord>,
    pub prev_week: HashMap<String, AppSalesRecord>,
}

/// Catalog metadata for an app + storefront country pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AppMetadata {
    pub title: String,
    pub icon_url: Option<String>,
}

/// Display tone of a digest section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSection {
    pub tone: Tone,
    pub name: String,
    pub icon: Option<String>,
    pub fields: Vec<MessageField>,
}

/// Display-ready digest: one totals section followed by per-app sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub sections: Vec<MessageSection>,
}
