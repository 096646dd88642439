//! Record filtering by date window, manufacturer, and vehicle type

use crate::metrics::types::{DateRange, RegistrationRow};
use std::collections::BTreeSet;

/// Filter for registration records
///
/// Every unset criterion matches everything. An explicitly empty
/// manufacturer or vehicle-type set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Inclusive date window
    pub date_range: Option<DateRange>,
    /// Allowed manufacturers
    pub manufacturers: Option<BTreeSet<String>>,
    /// Allowed vehicle types
    pub vehicle_types: Option<BTreeSet<String>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn manufacturers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manufacturers = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn vehicle_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vehicle_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Check if a record passes every criterion
    pub fn matches<R: RegistrationRow>(&self, record: &R) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(record.date()) {
                return false;
            }
        }

        if let Some(allowed) = &self.manufacturers {
            if !allowed.contains(record.manufacturer()) {
                return false;
            }
        }

        if let Some(allowed) = &self.vehicle_types {
            if !allowed.contains(record.vehicle_type()) {
                return false;
            }
        }

        true
    }

    /// Copy out the matching records, preserving input order
    pub fn apply<R: RegistrationRow + Clone>(&self, records: &[R]) -> Vec<R> {
        records.iter().filter(|r| self.matches(*r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::types::Record;
    use chrono::NaiveDate;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new(month(2023, 1), "Honda", "2W", 1000),
            Record::new(month(2023, 2), "Honda", "4W", 200),
            Record::new(month(2023, 3), "Hero", "2W", 500),
            Record::new(month(2023, 4), "Tata", "4W", 300),
        ]
    }

    #[test]
    fn test_default_filter_matches_all() {
        assert_eq!(RecordFilter::new().apply(&records()).len(), 4);
    }

    #[test]
    fn test_filter_by_date_range() {
        let filter = RecordFilter::new().date_range(DateRange::new(month(2023, 2), month(2023, 3)));
        let kept = filter.apply(&records());

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].date, month(2023, 2));
        assert_eq!(kept[1].date, month(2023, 3));
    }

    #[test]
    fn test_filter_by_manufacturer_and_type() {
        let filter = RecordFilter::new()
            .manufacturers(["Honda", "Tata"])
            .vehicle_types(["4W"]);
        let kept = filter.apply(&records());

        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.vehicle_type == "4W"));
    }

    #[test]
    fn test_empty_selection_matches_nothing() {
        let filter = RecordFilter::new().manufacturers(Vec::<String>::new());
        assert!(filter.apply(&records()).is_empty());
    }
}
