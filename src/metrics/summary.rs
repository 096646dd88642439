//! Scalar KPI summary over a set of enriched records

use crate::metrics::aggregate::group_sum;
use crate::metrics::types::EnrichedRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Headline numbers for a filtered record set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    /// Sum of registrations over every record
    pub total_registrations: u64,
    /// All-segment YoY growth at the latest date
    pub latest_yoy_growth_total: Option<f64>,
    /// All-segment QoQ growth at the latest date
    pub latest_qoq_growth_total: Option<f64>,
    /// Manufacturer with the most registrations
    pub top_manufacturer: String,
    pub record_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Summarize an enriched record set, or None if it is empty
///
/// The total growth fields are read from a record at the greatest date,
/// which is well defined because every record of a date carries the same
/// totals. Top manufacturer ties go to the name that sorts first.
pub fn summarize(records: &[EnrichedRecord]) -> Option<Summary> {
    let latest = records.iter().max_by_key(|r| r.record.date)?;
    let first_date = records.iter().map(|r| r.record.date).min()?;

    let by_manufacturer = group_sum(records, |r| r.record.manufacturer.as_str());
    let (top_manufacturer, _) = by_manufacturer
        .into_iter()
        .max_by(|(a_name, a_total), (b_name, b_total)| {
            a_total.cmp(b_total).then_with(|| b_name.cmp(a_name))
        })?;

    Some(Summary {
        total_registrations: records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.record.registrations)),
        latest_yoy_growth_total: latest.yoy_growth_total,
        latest_qoq_growth_total: latest.qoq_growth_total,
        top_manufacturer: top_manufacturer.to_string(),
        record_count: records.len(),
        first_date,
        last_date: latest.record.date,
    })
}

/// Render a growth ratio as a percentage with two decimals, or "N/A"
pub fn format_growth(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) if r.is_finite() => format!("{:.2}%", r * 100.0),
        _ => "N/A".to_string(),
    }
}

/// Render an integer with thousands separators (1234567 → "1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
