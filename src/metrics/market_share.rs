//! Market Share Calculator
//!
//! Aggregates registrations per manufacturer (across vehicle types) inside
//! an inclusive date window and expresses each as a percentage of the window
//! total.

use crate::metrics::aggregate::group_sum;
use crate::metrics::types::{DateRange, MarketShareRow, RegistrationRow};

/// Compute each manufacturer's share of registrations in `range`
///
/// Returns an empty vector when no record falls inside the window or the
/// window's total is zero. Rows are sorted by share descending, ties by
/// manufacturer name ascending.
pub fn compute_market_share<R: RegistrationRow>(
    records: &[R],
    range: DateRange,
) -> Vec<MarketShareRow> {
    let by_manufacturer = group_sum(
        records.iter().filter(|r| range.contains(r.date())),
        |r| r.manufacturer().to_string(),
    );

    let total = by_manufacturer
        .values()
        .fold(0u64, |acc, v| acc.saturating_add(*v));
    if total == 0 {
        tracing::debug!(range = %range, "No registrations in window");
        return Vec::new();
    }

    let mut rows: Vec<MarketShareRow> = by_manufacturer
        .into_iter()
        .map(|(manufacturer, registrations)| MarketShareRow {
            manufacturer,
            registrations,
            market_share_pct: 100.0 * registrations as f64 / total as f64,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.market_share_pct
            .partial_cmp(&a.market_share_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.manufacturer.cmp(&b.manufacturer))
    });

    tracing::debug!(
        range = %range,
        manufacturers = rows.len(),
        total,
        "Computed market share"
    );

    rows
}
