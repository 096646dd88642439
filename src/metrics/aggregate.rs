//! Aggregation and alignment primitives
//!
//! Grouping and period-offset comparison shared by the growth and market
//! share calculators. The missing/zero predecessor policy lives in
//! [`growth_ratio`] and nowhere else.

use crate::metrics::types::RegistrationRow;
use chrono::{Months, NaiveDate};
use std::collections::HashMap;
use std::hash::Hash;

/// Sum registrations per key
///
/// The key can be anything derived from a row: a segment, a date, a
/// manufacturer. Iteration order of the result is unspecified. Sums
/// saturate at `u64::MAX`.
pub fn group_sum<'a, R, K, I, F>(records: I, mut key_fn: F) -> HashMap<K, u64>
where
    R: RegistrationRow + 'a,
    I: IntoIterator<Item = &'a R>,
    K: Eq + Hash,
    F: FnMut(&'a R) -> K,
{
    let mut sums: HashMap<K, u64> = HashMap::new();
    for record in records {
        let sum = sums.entry(key_fn(record)).or_insert(0);
        *sum = sum.saturating_add(record.registrations());
    }
    sums
}

/// Relative change from `previous` to `current`
///
/// Returns None when `previous` is zero. Never returns infinity or NaN for
/// finite inputs.
pub fn growth_ratio(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}

/// Growth of each value vs. the value `offset` positions earlier
///
/// `result[i]` is `(v[i] - v[i-offset]) / v[i-offset]` when `i >= offset`
/// and the predecessor is non-zero, otherwise None. The offset counts
/// positions, not calendar periods: gaps in the underlying series shift
/// what "12 periods ago" refers to.
pub fn positional_offset_ratio(values: &[f64], offset: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            let prev_idx = i.checked_sub(offset)?;
            growth_ratio(current, values[prev_idx])
        })
        .collect()
}

/// Growth of each value vs. the value dated exactly `months` earlier
///
/// Predecessors are found by date equality after subtracting whole months
/// (month ends clamp, so Mar 31 looks back to Feb 28). A missing
/// predecessor yields None, as does a zero one.
pub fn calendar_offset_ratio(series: &[(NaiveDate, f64)], months: u32) -> Vec<Option<f64>> {
    let by_date: HashMap<NaiveDate, f64> = series.iter().copied().collect();

    series
        .iter()
        .map(|&(date, current)| {
            let prev_date = date.checked_sub_months(Months::new(months))?;
            let previous = by_date.get(&prev_date)?;
            growth_ratio(current, *previous)
        })
        .collect()
}
