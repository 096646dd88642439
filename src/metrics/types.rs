//! Core data types for the registration metrics engine
//!
//! This module defines the values that flow through the engine:
//! - `Record`: one registration count for a (date, manufacturer, vehicle type)
//! - `EnrichedRecord`: a record with its growth ratios attached
//! - `MarketShareRow`: a manufacturer's share of a date window
//! - `DateRange`: an inclusive window of calendar dates
//! - `Segment`: the (manufacturer, vehicle type) key of one time series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read access to the columns the calculators need.
///
/// Implemented by both `Record` and `EnrichedRecord` so the market share
/// calculator and the record filter accept either.
pub trait RegistrationRow {
    fn date(&self) -> NaiveDate;
    fn manufacturer(&self) -> &str;
    fn vehicle_type(&self) -> &str;
    fn registrations(&self) -> u64;
}

/// A single monthly registration count
///
/// At most one record exists per (date, manufacturer, vehicle_type).
/// A month with no record means "no data", not zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Record {
    /// Period the count belongs to (day granularity, monthly cadence)
    pub date: NaiveDate,
    /// Manufacturer name, e.g. "Honda"
    pub manufacturer: String,
    /// Vehicle category, e.g. "2W"
    pub vehicle_type: String,
    /// Number of registrations in the period
    pub registrations: u64,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        manufacturer: impl Into<String>,
        vehicle_type: impl Into<String>,
        registrations: u64,
    ) -> Self {
        Self {
            date,
            manufacturer: manufacturer.into(),
            vehicle_type: vehicle_type.into(),
            registrations,
        }
    }

    /// The segment this record's time series belongs to
    pub fn segment(&self) -> Segment {
        Segment::new(&self.manufacturer, &self.vehicle_type)
    }
}

impl RegistrationRow for Record {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    fn registrations(&self) -> u64 {
        self.registrations
    }
}

/// A (manufacturer, vehicle type) pair identifying one independent series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    pub manufacturer: String,
    pub vehicle_type: String,
}

impl Segment {
    pub fn new(manufacturer: impl Into<String>, vehicle_type: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            vehicle_type: vehicle_type.into(),
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.manufacturer, self.vehicle_type)
    }
}

/// A record with its growth ratios attached
///
/// Ratios are fractions (0.1 = +10%). `None` means the predecessor is
/// missing or was zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: Record,
    /// Growth vs. 12 observations earlier in the same segment
    pub yoy_growth: Option<f64>,
    /// Growth vs. 3 observations earlier in the same segment
    pub qoq_growth: Option<f64>,
    /// All-segment total for this date vs. the total 12 dates earlier
    pub yoy_growth_total: Option<f64>,
    /// All-segment total for this date vs. the total 3 dates earlier
    pub qoq_growth_total: Option<f64>,
}

impl EnrichedRecord {
    /// Wrap a record with no growth data
    pub fn bare(record: Record) -> Self {
        Self {
            record,
            yoy_growth: None,
            qoq_growth: None,
            yoy_growth_total: None,
            qoq_growth_total: None,
        }
    }
}

impl RegistrationRow for EnrichedRecord {
    fn date(&self) -> NaiveDate {
        self.record.date
    }

    fn manufacturer(&self) -> &str {
        &self.record.manufacturer
    }

    fn vehicle_type(&self) -> &str {
        &self.record.vehicle_type
    }

    fn registrations(&self) -> u64 {
        self.record.registrations
    }
}

/// One manufacturer's share of registrations within a date window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketShareRow {
    pub manufacturer: String,
    /// Registrations summed over every vehicle type in the window
    pub registrations: u64,
    /// Share of the window total, in percent (0 to 100)
    pub market_share_pct: f64,
}

/// Inclusive range of calendar dates: [start, end]
///
/// A range whose start is after its end is valid and contains nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The smallest range covering every record, or None for no records
    pub fn covering<R: RegistrationRow>(records: &[R]) -> Option<Self> {
        let start = records.iter().map(|r| r.date()).min()?;
        let end = records.iter().map(|r| r.date()).max()?;
        Some(Self { start, end })
    }

    /// Check if a date falls within this range (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when no date can fall inside the range
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start.format("%b %Y"), self.end.format("%b %Y"))
    }
}
