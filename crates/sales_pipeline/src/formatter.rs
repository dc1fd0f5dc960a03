//! Comparative digest formatting: totals, ranking and the display shapes
//! for percent changes, currency and counts.

use chrono::NaiveDate;
use models::{
    AppSalesRecord, DisplayMessage, MessageField, MessageSection, SalesSnapshot, Tone,
};

/// Most per-app sections one digest carries; the excess is dropped silently.
const MAX_APP_SECTIONS: usize = 20;

const TOTALS_NAME: &str = "Totals";

/// Installs/revenue pair for one period, for an app or for the totals.
#[derive(Debug, Clone, Copy, Default)]
struct Figures {
    installs: u64,
    revenue: f64,
}

impl Figures {
    fn of(record: &AppSalesRecord) -> Self {
        Self {
            installs: record.installs,
            revenue: record.revenue,
        }
    }

    fn add(&mut self, record: &AppSalesRecord) {
        self.installs += record.installs;
        self.revenue += record.revenue;
    }
}

/// Builds the digest for one target date.
///
/// Pure function of its inputs: equal snapshot + date give byte-identical
/// output, including section order.
pub fn build_message(snapshot: &SalesSnapshot, date: NaiveDate) -> DisplayMessage {
    if snapshot.day.is_empty() {
        return DisplayMessage {
            sections: vec![MessageSection {
                tone: Tone::Good,
                name: format!("No sales reported for {}", date.format("%Y-%m-%d")),
                icon: None,
                fields: Vec::new(),
            }],
        };
    }

    let mut app_ids: Vec<&String> = snapshot.day.keys().collect();
    app_ids.sort_by_cached_key(|id| (snapshot.day[*id].title.to_lowercase(), (*id).clone()));

    let zero = AppSalesRecord::default();
    let mut day_total = Figures::default();
    let mut prev_day_total = Figures::default();
    let mut prev_week_total = Figures::default();

    let mut app_sections = Vec::new();
    for id in &app_ids {
        let day = &snapshot.day[*id];
        let prev_day = snapshot.prev_day.get(*id).unwrap_or(&zero);
        let prev_week = snapshot.prev_week.get(*id).unwrap_or(&zero);

        // Totals run over every app, including those past the section cap.
        day_total.add(day);
        prev_day_total.add(prev_day);
        prev_week_total.add(prev_week);

        if app_sections.len() < MAX_APP_SECTIONS {
            app_sections.push(comparison_section(
                day.title.clone(),
                day.icon_url.clone(),
                Figures::of(day),
                Figures::of(prev_day),
                Figures::of(prev_week),
            ));
        }
    }

    let mut sections = Vec::with_capacity(app_sections.len() + 1);
    sections.push(comparison_section(
        TOTALS_NAME.to_string(),
        None,
        day_total,
        prev_day_total,
        prev_week_total,
    ));
    sections.extend(app_sections);

    DisplayMessage { sections }
}

/// One digest section comparing a day against its two baselines.
///
/// Nonzero revenue ranks by revenue; otherwise installs decide, and the
/// revenue fields are left out entirely.
fn comparison_section(
    name: String,
    icon: Option<String>,
    day: Figures,
    prev_day: Figures,
    prev_week: Figures,
) -> MessageSection {
    let good = if day.revenue != 0.0 {
        day.revenue > prev_day.revenue
    } else {
        day.installs > prev_day.installs
    };

    let mut fields = vec![
        MessageField {
            label: "Downloads".to_string(),
            value: format_count(day.installs),
        },
        MessageField {
            label: "Downloads Change".to_string(),
            value: change_pair(
                day.installs as f64,
                prev_day.installs as f64,
                prev_week.installs as f64,
            ),
        },
    ];
    if day.revenue != 0.0 {
        fields.push(MessageField {
            label: "Revenue".to_string(),
            value: format_usd(day.revenue),
        });
        fields.push(MessageField {
            label: "Revenue Change".to_string(),
            value: change_pair(day.revenue, prev_day.revenue, prev_week.revenue),
        });
    }

    MessageSection {
        tone: if good { Tone::Good } else { Tone::Bad },
        name,
        icon,
        fields,
    }
}

fn change_pair(current: f64, prev_day: f64, prev_week: f64) -> String {
    format!(
        "{} day / {} week",
        format_percent(percent_change(current, prev_day)),
        format_percent(percent_change(current, prev_week))
    )
}

/// Relative change of `current` against `baseline`, as a ratio (1.0 = 100%).
/// A zero baseline reads as a full gain, which also keeps the division safe.
pub fn percent_change(current: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        1.0
    } else {
        (current - baseline) / baseline.abs()
    }
}

/// `0.5` -> `+50.0%`, `-0.5` -> `-50.0%`, `12.5` -> `+1,250.0%`.
pub fn format_percent(change: f64) -> String {
    let pct = change * 100.0;
    let body = group_thousands(&format!("{:.1}", pct.abs()));
    if pct < 0.0 {
        format!("-{}%", body)
    } else {
        format!("+{}%", body)
    }
}

/// `1234.5` -> `$1,234`, `42.5` -> `$42.50`, `-5.2` -> `-$5.20`.
pub fn format_usd(value: f64) -> String {
    let abs = value.abs();
    let body = if abs >= 100.0 {
        format!("${}", group_thousands(&format!("{:.0}", abs)))
    } else {
        format!("${}", group_thousands(&format!("{:.2}", abs)))
    };
    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Thousands-grouped integer, no decimals.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Groups the integer part of a non-negative numeric string with commas.
fn group_thousands(value: &str) -> String {
    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (value, None),
    };

    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}
