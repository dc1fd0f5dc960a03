//! Exchange-rate table normalization.

use std::collections::HashMap;

/// Reference currency every report figure is normalized to.
pub const REFERENCE_CURRENCY: &str = "USD";

/// Guarantees the reference currency resolves to 1.0 before the table is
/// handed to the parser. An entry already delivered by the rate source is
/// left untouched.
pub fn with_usd_anchor(mut rates: HashMap<String, f64>) -> HashMap<String, f64> {
    rates.entry(REFERENCE_CURRENCY.to_string()).or_insert(1.0);
    rates
}
