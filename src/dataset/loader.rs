//! CSV Dataset Loader
//!
//! Reads registration records from CSV with the header
//! `Date,Manufacturer,Vehicle_Type,Registrations`. Columns are located by
//! name, so processed files carrying extra growth columns load as well.
//! Bad rows are reported and skipped; a missing header fails the load.

use crate::dataset::error::{DatasetError, DatasetResult};
use crate::metrics::Record;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Row errors kept in a report before the rest are summarized
const MAX_REPORTED_ERRORS: usize = 100;

/// Date formats tried after any configured ones
const DEFAULT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Result of loading a dataset
#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<Record>,
    /// Data rows seen, excluding the header
    pub rows_read: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Positions of the required columns in a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    manufacturer: usize,
    vehicle_type: usize,
    registrations: usize,
}

impl ColumnMap {
    /// Locate columns by name, ignoring case and `_`/space differences
    fn from_headers(headers: &csv::StringRecord) -> DatasetResult<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| normalize_header(h) == normalize_header(wanted))
                .ok_or_else(|| DatasetError::MissingColumn(wanted.to_string()))
        };

        Ok(Self {
            date: find("Date")?,
            manufacturer: find("Manufacturer")?,
            vehicle_type: find("Vehicle_Type")?,
            registrations: find("Registrations")?,
        })
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Registration CSV loader with configurable date formats
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    /// Formats tried before the built-in ones
    date_formats: Vec<String>,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try this date format before the built-in ones
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_formats.push(format.to_string());
        self
    }

    /// Load records from a CSV file
    pub fn load(&self, path: &Path) -> DatasetResult<LoadReport> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let report = self.load_from(reader)?;
        tracing::info!(
            path = %path.display(),
            records = report.records.len(),
            rows_failed = report.rows_failed,
            "Loaded registration dataset"
        );
        Ok(report)
    }

    /// Load records from a CSV string (useful for testing)
    pub fn load_str(&self, csv_data: &str) -> DatasetResult<LoadReport> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        self.load_from(reader)
    }

    fn load_from<R: Read>(&self, mut reader: csv::Reader<R>) -> DatasetResult<LoadReport> {
        let columns = ColumnMap::from_headers(reader.headers()?)?;

        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut rows_read = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            // Header is line 1
            let line = line_num + 2;
            rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    errors.push(format!("Line {}: {}", line, e));
                    continue;
                }
            };

            let record = match self.parse_row(&row, &columns, line) {
                Ok(record) => record,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };

            let key = (
                record.date,
                record.manufacturer.clone(),
                record.vehicle_type.clone(),
            );
            if !seen.insert(key) {
                errors.push(
                    DatasetError::InvalidRow {
                        line,
                        reason: format!(
                            "duplicate record for {} {} on {}",
                            record.manufacturer, record.vehicle_type, record.date
                        ),
                    }
                    .to_string(),
                );
                continue;
            }

            records.push(record);
        }

        let rows_failed = errors.len();
        for error in &errors {
            tracing::debug!(error = %error, "Skipped dataset row");
        }

        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        Ok(LoadReport {
            records,
            rows_read,
            rows_failed,
            errors,
        })
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        columns: &ColumnMap,
        line: usize,
    ) -> DatasetResult<Record> {
        let invalid = |reason: String| DatasetError::InvalidRow { line, reason };
        let field = |idx: usize, name: &str| {
            row.get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| invalid(format!("missing {}", name)))
        };

        let date_str = field(columns.date, "date")?;
        let date = self
            .parse_date(date_str)
            .ok_or_else(|| invalid(format!("could not parse date: {}", date_str)))?;

        let manufacturer = field(columns.manufacturer, "manufacturer")?;
        let vehicle_type = field(columns.vehicle_type, "vehicle type")?;
        let registrations = parse_registrations(field(columns.registrations, "registrations")?)
            .map_err(invalid)?;

        Ok(Record::new(date, manufacturer, vehicle_type, registrations))
    }

    /// Parse a date using the configured formats, then the built-in ones
    ///
    /// Accepts month-only dates (`2023-01`) as the first of the month and
    /// drops any time-of-day component.
    pub fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        let formats = self
            .date_formats
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_DATE_FORMATS);

        for fmt in formats {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }

        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }

        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()
    }
}

/// Parse a non-negative whole registration count
///
/// Accepts integral floats ("1200.0") as written by some exporters, up to
/// the largest integer an `f64` holds exactly.
fn parse_registrations(s: &str) -> Result<u64, String> {
    const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0; // 2^53

    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }

    match s.parse::<f64>() {
        Ok(v) if v < 0.0 => Err(format!("negative registrations: {}", s)),
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v <= MAX_EXACT_FLOAT => Ok(v as u64),
        _ => Err(format!("invalid registrations: {}", s)),
    }
}

/// Load records from a CSV file with the default loader
///
/// Skipped rows are logged as warnings.
pub fn load_records(path: &Path) -> DatasetResult<Vec<Record>> {
    let report = DatasetLoader::new().load(path)?;

    if report.rows_failed > 0 {
        tracing::warn!(
            path = %path.display(),
            rows_failed = report.rows_failed,
            "Some rows could not be loaded"
        );
        for error in report.errors.iter().take(10) {
            tracing::warn!("{}", error);
        }
    }

    Ok(report.records)
}
