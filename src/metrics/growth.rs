//! Growth Calculator
//!
//! Attaches year-over-year and quarter-over-quarter growth to every record,
//! both within the record's own segment and for the all-segment total at the
//! record's date.
//!
//! # Algorithm
//!
//! ```text
//! Records ─┬─ group by segment → sort by date → offset ratios ──┐
//!          │                                                    ├─ join by date → EnrichedRecords
//!          └─ sum by date → sort by date → offset ratios ───────┘
//! ```
//!
//! The total series is built once per call and joined through a date-keyed
//! map, so every record sharing a date carries the same total ratios.

use crate::metrics::aggregate::{calendar_offset_ratio, group_sum, positional_offset_ratio};
use crate::metrics::types::{EnrichedRecord, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// How a record's predecessor is located
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Lookback {
    /// N observations earlier in the sorted series, regardless of gaps
    #[default]
    Positional,
    /// The observation dated exactly N months earlier, absent if missing
    Calendar,
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookback::Positional => write!(f, "positional"),
            Lookback::Calendar => write!(f, "calendar"),
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positional" => Ok(Lookback::Positional),
            "calendar" => Ok(Lookback::Calendar),
            other => Err(format!(
                "Unknown lookback mode: {}. Use: positional, calendar",
                other
            )),
        }
    }
}

/// Offsets and lookback mode for growth computation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrowthOptions {
    /// Periods back for year-over-year growth
    pub yoy_periods: u32,
    /// Periods back for quarter-over-quarter growth
    pub qoq_periods: u32,
    pub lookback: Lookback,
}

impl Default for GrowthOptions {
    fn default() -> Self {
        Self {
            yoy_periods: 12,
            qoq_periods: 3,
            lookback: Lookback::Positional,
        }
    }
}

impl GrowthOptions {
    /// Builder: set lookback mode
    pub fn lookback(mut self, lookback: Lookback) -> Self {
        self.lookback = lookback;
        self
    }

    /// Growth ratios for a date-ordered series at the given offset
    fn ratios(&self, series: &[(NaiveDate, f64)], periods: u32) -> Vec<Option<f64>> {
        match self.lookback {
            Lookback::Positional => {
                let values: Vec<f64> = series.iter().map(|&(_, v)| v).collect();
                positional_offset_ratio(&values, periods as usize)
            }
            Lookback::Calendar => calendar_offset_ratio(series, periods),
        }
    }
}

/// Per-date growth of the all-segment total
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TotalGrowth {
    yoy: Option<f64>,
    qoq: Option<f64>,
}

/// Compute growth metrics with the default options (YoY = 12, QoQ = 3,
/// positional lookback)
///
/// Returns exactly one `EnrichedRecord` per input record, ordered by
/// (manufacturer, vehicle_type, date).
pub fn compute_growth(records: &[Record]) -> Vec<EnrichedRecord> {
    compute_growth_with(records, &GrowthOptions::default())
}

/// Compute growth metrics with explicit offsets and lookback mode
pub fn compute_growth_with(records: &[Record], options: &GrowthOptions) -> Vec<EnrichedRecord> {
    if records.is_empty() {
        return Vec::new();
    }

    let totals = total_growth_by_date(records, options);

    // BTreeMap keeps segments in (manufacturer, vehicle_type) order
    let mut segments: BTreeMap<(&str, &str), Vec<&Record>> = BTreeMap::new();
    for record in records {
        segments
            .entry((record.manufacturer.as_str(), record.vehicle_type.as_str()))
            .or_default()
            .push(record);
    }

    let segment_count = segments.len();
    let mut enriched = Vec::with_capacity(records.len());

    for (_, mut series) in segments {
        series.sort_by_key(|r| r.date);

        let dated: Vec<(NaiveDate, f64)> = series
            .iter()
            .map(|r| (r.date, r.registrations as f64))
            .collect();
        let yoy = options.ratios(&dated, options.yoy_periods);
        let qoq = options.ratios(&dated, options.qoq_periods);

        for (i, record) in series.into_iter().enumerate() {
            let total = totals.get(&record.date).copied().unwrap_or_default();
            enriched.push(EnrichedRecord {
                record: record.clone(),
                yoy_growth: yoy[i],
                qoq_growth: qoq[i],
                yoy_growth_total: total.yoy,
                qoq_growth_total: total.qoq,
            });
        }
    }

    tracing::debug!(
        records = enriched.len(),
        segments = segment_count,
        dates = totals.len(),
        lookback = %options.lookback,
        "Computed growth metrics"
    );

    enriched
}

/// Sum registrations per date and compute the total series' growth
fn total_growth_by_date(
    records: &[Record],
    options: &GrowthOptions,
) -> HashMap<NaiveDate, TotalGrowth> {
    let mut series: Vec<(NaiveDate, f64)> = group_sum(records, |r| r.date)
        .into_iter()
        .map(|(date, total)| (date, total as f64))
        .collect();
    series.sort_by_key(|&(date, _)| date);

    let yoy = options.ratios(&series, options.yoy_periods);
    let qoq = options.ratios(&series, options.qoq_periods);

    series
        .iter()
        .enumerate()
        .map(|(i, &(date, _))| {
            (
                date,
                TotalGrowth {
                    yoy: yoy[i],
                    qoq: qoq[i],
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    /// Consecutive months starting at Jan 2022
    fn monthly(manufacturer: &str, vehicle_type: &str, counts: &[u64]) -> Vec<Record> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let date = month(2022, 1)
                    .checked_add_months(chrono::Months::new(i as u32))
                    .unwrap();
                Record::new(date, manufacturer, vehicle_type, n)
            })
            .collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a ratio");
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_growth(&[]).is_empty());
    }

    #[test]
    fn test_constant_series_yoy() {
        let records = monthly("Honda", "2W", &[100; 15]);
        let enriched = compute_growth(&records);

        assert_eq!(enriched.len(), 15);
        for (i, row) in enriched.iter().enumerate() {
            if i < 12 {
                assert_eq!(row.yoy_growth, None, "row {}", i);
            } else {
                assert_eq!(row.yoy_growth, Some(0.0), "row {}", i);
            }
        }
        assert_eq!(enriched[2].qoq_growth, None);
        assert_eq!(enriched[3].qoq_growth, Some(0.0));
    }

    #[test]
    fn test_segment_and_total_growth() {
        let mut records = monthly("Honda", "2W", &[100, 110, 120, 130]);
        records.extend(monthly("Hero", "2W", &[50, 50, 50, 100]));

        let enriched = compute_growth(&records);
        let last_honda = enriched
            .iter()
            .find(|r| r.record.manufacturer == "Honda" && r.record.date == month(2022, 4))
            .unwrap();

        // 130 vs 100 three observations earlier
        assert_close(last_honda.qoq_growth, 0.3);
        // total 230 vs 150
        assert_close(last_honda.qoq_growth_total, 80.0 / 150.0);
        assert_eq!(last_honda.yoy_growth, None);
        assert_eq!(last_honda.yoy_growth_total, None);
    }

    #[test]
    fn test_cardinality_and_bijection() {
        let mut records = monthly("Honda", "2W", &[10, 20, 30, 40, 50]);
        records.extend(monthly("Honda", "4W", &[1, 2, 3]));
        records.extend(monthly("Tata", "4W", &[7, 0, 7, 7]));

        let enriched = compute_growth(&records);
        assert_eq!(enriched.len(), records.len());

        let input: HashSet<_> = records
            .iter()
            .map(|r| (r.date, r.manufacturer.clone(), r.vehicle_type.clone()))
            .collect();
        let output: HashSet<_> = enriched
            .iter()
            .map(|e| (e.record.date, e.record.manufacturer.clone(), e.record.vehicle_type.clone()))
            .collect();
        assert_eq!(input, output);
    }

    #[test]
    fn test_total_broadcast_per_date() {
        let mut records = monthly("Honda", "2W", &[100, 120, 90, 130, 150]);
        records.extend(monthly("Hero", "2W", &[80, 60, 70, 90, 40]));
        records.extend(monthly("Tata", "4W", &[5, 6, 7, 8, 9]));

        let enriched = compute_growth(&records);
        let mut by_date: HashMap<NaiveDate, (Option<f64>, Option<f64>)> = HashMap::new();

        for row in &enriched {
            let totals = (row.yoy_growth_total, row.qoq_growth_total);
            let seen = by_date.entry(row.record.date).or_insert(totals);
            assert_eq!(*seen, totals);
        }
    }

    #[test]
    fn test_date_present_for_one_segment_only() {
        let mut records = monthly("Honda", "2W", &[100, 100, 100, 100, 300]);
        records.extend((2..=5).map(|m| Record::new(month(2022, m), "Hero", "2W", 50)));

        let enriched = compute_growth(&records);
        assert_eq!(enriched.len(), 9);
        let find = |manufacturer: &str, date: NaiveDate| {
            enriched
                .iter()
                .find(|r| r.record.manufacturer == manufacturer && r.record.date == date)
                .unwrap()
        };

        // Totals: Jan 100, Feb 150, Mar 150, Apr 150, May 350
        let honda_may = find("Honda", month(2022, 5));
        assert_close(honda_may.qoq_growth, 2.0);
        assert_close(honda_may.qoq_growth_total, 200.0 / 150.0);

        // Hero's own series starts in Feb
        let hero_may = find("Hero", month(2022, 5));
        assert_close(hero_may.qoq_growth, 0.0);
        assert_close(hero_may.qoq_growth_total, 200.0 / 150.0);

        let hero_apr = find("Hero", month(2022, 4));
        assert_eq!(hero_apr.qoq_growth, None);
        assert_close(hero_apr.qoq_growth_total, 0.5);

        let jan: Vec<_> = enriched
            .iter()
            .filter(|r| r.record.date == month(2022, 1))
            .collect();
        assert_eq!(jan.len(), 1);
        assert_eq!(jan[0].qoq_growth_total, None);
    }

    #[test]
    fn test_zero_predecessor_is_absent() {
        let records = monthly("Tata", "4W", &[0, 10, 20, 30]);
        let enriched = compute_growth(&records);

        // QoQ at position 3 compares against the zero at position 0
        assert_eq!(enriched[3].qoq_growth, None);
        assert_eq!(enriched[3].qoq_growth_total, None);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut records = monthly("Honda", "2W", &[100, 110, 120, 130, 140]);
        records.extend(monthly("Hero", "2W", &[40, 50, 60, 70, 80]));

        let sorted = compute_growth(&records);
        records.reverse();
        let shuffled = compute_growth(&records);

        assert_eq!(sorted, shuffled);
        assert_eq!(sorted[0].record.manufacturer, "Hero");
    }

    #[test]
    fn test_output_order() {
        let records = vec![
            Record::new(month(2022, 2), "Honda", "2W", 1),
            Record::new(month(2022, 1), "Honda", "4W", 1),
            Record::new(month(2022, 1), "Honda", "2W", 1),
            Record::new(month(2022, 1), "Bajaj", "3W", 1),
        ];

        let keys: Vec<_> = compute_growth(&records)
            .into_iter()
            .map(|e| (e.record.manufacturer, e.record.vehicle_type, e.record.date))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("Bajaj".to_string(), "3W".to_string(), month(2022, 1)),
                ("Honda".to_string(), "2W".to_string(), month(2022, 1)),
                ("Honda".to_string(), "2W".to_string(), month(2022, 2)),
                ("Honda".to_string(), "4W".to_string(), month(2022, 1)),
            ]
        );
    }

    #[test]
    fn test_gapped_segment_positional_vs_calendar() {
        // Jan..Apr with March missing
        let records = vec![
            Record::new(month(2022, 1), "Honda", "2W", 100),
            Record::new(month(2022, 2), "Honda", "2W", 100),
            Record::new(month(2022, 4), "Honda", "2W", 150),
            Record::new(month(2022, 5), "Honda", "2W", 200),
        ];

        let options = GrowthOptions::default();
        let positional = compute_growth_with(&records, &options);
        // Position 3 (May) looks back three observations to Jan
        assert_close(positional[3].qoq_growth, 1.0);

        let calendar = compute_growth_with(&records, &options.lookback(Lookback::Calendar));
        // May looks back to Feb by date
        assert_close(calendar[3].qoq_growth, 1.0);
        // Apr would need Jan: present, 150 vs 100
        assert_close(calendar[2].qoq_growth, 0.5);
        // Positional Apr is only the third observation
        assert_eq!(positional[2].qoq_growth, None);
    }

    #[test]
    fn test_gapped_segment_yoy_diverges() {
        // 13 observations spanning 14 months (one gap)
        let mut records = Vec::new();
        for i in 0..14u32 {
            if i == 5 {
                continue;
            }
            let date = month(2022, 1)
                .checked_add_months(chrono::Months::new(i))
                .unwrap();
            records.push(Record::new(date, "Hero", "2W", 100 + i as u64));
        }

        let positional = compute_growth(&records);
        // Last record (Feb 2023) compares with the first observation (Jan 2022)
        assert_close(positional[12].yoy_growth, (113.0 - 100.0) / 100.0);

        let options = GrowthOptions::default().lookback(Lookback::Calendar);
        let calendar = compute_growth_with(&records, &options);
        // Feb 2023 compares with Feb 2022
        assert_close(calendar[12].yoy_growth, (113.0 - 101.0) / 101.0);
        // Jan 2023 compares with Jan 2022
        assert_close(calendar[11].yoy_growth, (112.0 - 100.0) / 100.0);
    }

    #[test]
    fn test_custom_offsets() {
        let records = monthly("Honda", "2W", &[100, 200, 300]);
        let options = GrowthOptions {
            yoy_periods: 2,
            qoq_periods: 1,
            lookback: Lookback::Positional,
        };

        let enriched = compute_growth_with(&records, &options);
        assert_close(enriched[1].qoq_growth, 1.0);
        assert_close(enriched[2].yoy_growth, 2.0);
    }

    #[test]
    fn test_repeatable_output() {
        let mut records = monthly("Honda", "2W", &[3, 1, 4, 1, 5, 9, 2, 6]);
        records.extend(monthly("Hero", "2W", &[2, 7, 1, 8, 2, 8, 1, 8]));

        assert_eq!(compute_growth(&records), compute_growth(&records));
    }

    #[test]
    fn test_lookback_parse() {
        assert_eq!("positional".parse::<Lookback>(), Ok(Lookback::Positional));
        assert_eq!("Calendar".parse::<Lookback>(), Ok(Lookback::Calendar));
        assert!("weekly".parse::<Lookback>().is_err());
    }
}
