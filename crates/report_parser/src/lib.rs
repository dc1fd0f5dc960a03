//! Turns raw daily sales report rows into per-app aggregates.
//!
//! The feed does not fix column order, so indices are resolved from the
//! header row by exact name on every parse. Revenue is converted to USD
//! while accumulating, never afterwards.

use std::collections::HashMap;

use models::{AppSalesRecord, ProductTypeClass};
use tracing::warn;

pub const COL_APP_ID: &str = "Apple Identifier";
pub const COL_COUNTRY: &str = "Country Code";
pub const COL_CURRENCY: &str = "Currency of Proceeds";
pub const COL_TITLE: &str = "Title";
pub const COL_UNITS: &str = "Units";
pub const COL_PROCEEDS: &str = "Developer Proceeds";
pub const COL_PRODUCT_TYPE: &str = "Product Type Identifier";

/// Schema mismatch between the feed and what the digest needs.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("required column '{column}' missing from report header")]
    MissingColumn { column: &'static str },
}

/// Column positions resolved from one header row.
struct ColumnIndex {
    app_id: usize,
    country: usize,
    currency: usize,
    title: usize,
    units: usize,
    proceeds: usize,
    product_type: usize,
}

impl ColumnIndex {
    fn resolve(header: &[String]) -> Result<Self, ParseError> {
        Ok(Self {
            app_id: find_col(header, COL_APP_ID)?,
            country: find_col(header, COL_COUNTRY)?,
            currency: find_col(header, COL_CURRENCY)?,
            title: find_col(header, COL_TITLE)?,
            units: find_col(header, COL_UNITS)?,
            proceeds: find_col(header, COL_PROCEEDS)?,
            product_type: find_col(header, COL_PRODUCT_TYPE)?,
        })
    }
}

fn find_col(header: &[String], name: &'static str) -> Result<usize, ParseError> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(ParseError::MissingColumn { column: name })
}

/// Parses report rows (header first) into a map keyed by app identifier.
///
/// A header-only or empty feed means zero sales and returns an empty map.
/// Rows whose currency is absent from `rates` keep their record but
/// contribute nothing; unparseable units/proceeds count as zero.
pub fn parse_report(
    rows: &[Vec<String>],
    rates: &HashMap<String, f64>,
) -> Result<HashMap<String, AppSalesRecord>, ParseError> {
    let mut apps: HashMap<String, AppSalesRecord> = HashMap::new();
    if rows.len() < 2 {
        return Ok(apps);
    }

    let cols = ColumnIndex::resolve(&rows[0])?;

    for row in &rows[1..] {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("").trim();

        let app_id = cell(cols.app_id);
        if app_id.is_empty() {
            continue;
        }

        // First occurrence of an app fixes its title and country.
        let record = apps
            .entry(app_id.to_string())
            .or_insert_with(|| AppSalesRecord::stub(cell(cols.title), cell(cols.country)));

        let currency = cell(cols.currency);
        let Some(fx_rate) = usable_rate(rates, currency) else {
            warn!(
                "no exchange rate for currency '{}' (app {}), row skipped",
                currency, app_id
            );
            continue;
        };

        let class = ProductTypeClass::classify(cell(cols.product_type));
        let units: f64 = cell(cols.units).parse().unwrap_or(0.0);
        let proceeds: f64 = cell(cols.proceeds).parse().unwrap_or(0.0);

        if class.counts_revenue() {
            // fx_rate is foreign units per 1 USD, so division converts.
            record.revenue += units * proceeds / fx_rate;
        }
        if class.counts_installs() {
            record.installs += units.max(0.0) as u64;
        }
    }

    Ok(apps)
}

/// A rate only converts anything if it is a positive finite number.
fn usable_rate(rates: &HashMap<String, f64>, currency: &str) -> Option<f64> {
    rates
        .get(currency)
        .copied()
        .filter(|r| r.is_finite() && *r > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        [
            "Provider",
            COL_TITLE,
            COL_PRODUCT_TYPE,
            COL_UNITS,
            COL_PROCEEDS,
            COL_CURRENCY,
            COL_COUNTRY,
            COL_APP_ID,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn row(
        title: &str,
        product_type: &str,
        units: &str,
        proceeds: &str,
        currency: &str,
        country: &str,
        app_id: &str,
    ) -> Vec<String> {
        ["APPLE", title, product_type, units, proceeds, currency, country, app_id]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn usd_rates() -> HashMap<String, f64> {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("GBP".to_string(), 0.5);
        rates
    }

    #[test]
    fn test_product_type_classify() {
        assert_eq!(ProductTypeClass::classify("1"), ProductTypeClass::Install);
        assert_eq!(ProductTypeClass::classify("1F"), ProductTypeClass::Install);
        assert_eq!(ProductTypeClass::classify("F1"), ProductTypeClass::Install);
        assert_eq!(
            ProductTypeClass::classify("IA1"),
            ProductTypeClass::InAppPurchase
        );
        assert_eq!(
            ProductTypeClass::classify("IAY"),
            ProductTypeClass::InAppPurchase
        );
        assert_eq!(ProductTypeClass::classify("7T"), ProductTypeClass::Other);
        assert_eq!(ProductTypeClass::classify(""), ProductTypeClass::Other);
    }

    #[test]
    fn test_empty_and_header_only_mean_zero_sales() {
        let rates = usd_rates();
        assert!(parse_report(&[], &rates).unwrap().is_empty());
        assert!(parse_report(&[header()], &rates).unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let mut bad_header = header();
        bad_header.retain(|h| h != COL_UNITS);
        let rows = vec![bad_header, row("A", "1", "1", "0.99", "USD", "US", "100")];
        let err = parse_report(&rows, &usd_rates()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { column } if column == COL_UNITS));
    }

    #[test]
    fn test_accumulates_installs_and_usd_revenue() {
        let rows = vec![
            header(),
            row("Alpha", "1F", "3", "1.99", "USD", "US", "100"),
            // 2 units at 0.50 GBP each, at 0.5 GBP per USD -> 2.00 USD
            row("Alpha", "IA1", "2", "0.5", "GBP", "GB", "100"),
            row("Beta", "1", "10", "0", "USD", "DE", "200"),
        ];
        let apps = parse_report(&rows, &usd_rates()).unwrap();
        assert_eq!(apps.len(), 2);

        let alpha = &apps["100"];
        assert_eq!(alpha.title, "Alpha");
        assert_eq!(alpha.country, "US");
        assert_eq!(alpha.installs, 3);
        assert!((alpha.revenue - (3.0 * 1.99 + 2.0)).abs() < 1e-9);

        let beta = &apps["200"];
        assert_eq!(beta.installs, 10);
        assert_eq!(beta.revenue, 0.0);
    }

    #[test]
    fn test_iap_rows_contribute_revenue_only() {
        let rows = vec![header(), row("Alpha", "IA9", "4", "2.5", "USD", "US", "100")];
        let apps = parse_report(&rows, &usd_rates()).unwrap();
        assert_eq!(apps["100"].installs, 0);
        assert!((apps["100"].revenue - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_currency_skips_row_but_keeps_record() {
        let rows = vec![
            header(),
            row("Alpha", "1", "5", "0.99", "USD", "US", "100"),
            row("Alpha", "1", "7", "120", "XXX", "JP", "100"),
            row("Beta", "1", "9", "50", "XXX", "JP", "200"),
        ];
        let apps = parse_report(&rows, &usd_rates()).unwrap();

        let alpha = &apps["100"];
        assert_eq!(alpha.installs, 5);
        assert!((alpha.revenue - 4.95).abs() < 1e-9);

        // The record survives even though every row was skipped.
        let beta = &apps["200"];
        assert_eq!(beta.installs, 0);
        assert_eq!(beta.revenue, 0.0);
    }

    #[test]
    fn test_unparseable_numbers_count_as_zero() {
        let rows = vec![
            header(),
            row("Alpha", "1", "n/a", "oops", "USD", "US", "100"),
            row("Alpha", "1", "2", "1.0", "USD", "US", "100"),
        ];
        let apps = parse_report(&rows, &usd_rates()).unwrap();
        assert_eq!(apps["100"].installs, 2);
        assert!((apps["100"].revenue - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_row_fixes_title_and_country() {
        let rows = vec![
            header(),
            row("Old Name", "1", "1", "0", "USD", "US", "100"),
            row("New Name", "1", "1", "0", "USD", "DE", "100"),
        ];
        let apps = parse_report(&rows, &usd_rates()).unwrap();
        assert_eq!(apps["100"].title, "Old Name");
        assert_eq!(apps["100"].country, "US");
        assert_eq!(apps["100"].installs, 2);
    }

    #[test]
    fn test_update_rows_contribute_nothing() {
        let rows = vec![header(), row("Alpha", "7T", "50", "0.99", "USD", "US", "100")];
        let apps = parse_report(&rows, &usd_rates()).unwrap();
        assert_eq!(apps["100"].installs, 0);
        assert_eq!(apps["100"].revenue, 0.0);
    }

    #[test]
    fn test_negative_units_refund_revenue_not_installs() {
        let rows = vec![header(), row("Alpha", "1", "-2", "0.99", "USD", "US", "100")];
        let apps = parse_report(&rows, &usd_rates()).unwrap();
        assert_eq!(apps["100"].installs, 0);
        assert!((apps["100"].revenue + 1.98).abs() < 1e-9);
    }
}
