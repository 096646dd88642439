//! Processed dataset writer
//!
//! Persists enriched records with their growth columns, and runs the
//! load → compute → write pipeline for raw files.

use crate::dataset::error::DatasetResult;
use crate::dataset::loader::DatasetLoader;
use crate::metrics::{compute_growth_with, EnrichedRecord, GrowthOptions};
use std::io::Write;
use std::path::Path;

/// Column headers of a processed file
pub const PROCESSED_HEADERS: [&str; 8] = [
    "Date",
    "Manufacturer",
    "Vehicle_Type",
    "Registrations",
    "YoY_Growth",
    "QoQ_Growth",
    "YoY_Growth_Total",
    "QoQ_Growth_Total",
];

/// Outcome of processing a raw file
#[derive(Debug)]
pub struct ProcessReport {
    pub rows_read: usize,
    pub rows_failed: usize,
    pub rows_written: usize,
    pub errors: Vec<String>,
}

fn ratio_cell(ratio: Option<f64>) -> String {
    ratio.map(|r| r.to_string()).unwrap_or_default()
}

/// Write enriched records as CSV; absent ratios become empty cells
pub fn write_processed<W: Write>(writer: W, records: &[EnrichedRecord]) -> DatasetResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(PROCESSED_HEADERS)?;

    for row in records {
        csv_writer.write_record([
            row.record.date.format("%Y-%m-%d").to_string(),
            row.record.manufacturer.clone(),
            row.record.vehicle_type.clone(),
            row.record.registrations.to_string(),
            ratio_cell(row.yoy_growth),
            ratio_cell(row.qoq_growth),
            ratio_cell(row.yoy_growth_total),
            ratio_cell(row.qoq_growth_total),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write enriched records to a file, creating parent directories
pub fn write_processed_path(path: &Path, records: &[EnrichedRecord]) -> DatasetResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(path)?;
    write_processed(std::io::BufWriter::new(file), records)?;

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Wrote processed dataset"
    );
    Ok(())
}

/// Load a raw dataset, attach growth metrics, and write the processed file
pub fn process_file(
    raw_path: &Path,
    processed_path: &Path,
    options: &GrowthOptions,
) -> DatasetResult<ProcessReport> {
    let report = DatasetLoader::new().load(raw_path)?;
    let enriched = compute_growth_with(&report.records, options);
    write_processed_path(processed_path, &enriched)?;

    Ok(ProcessReport {
        rows_read: report.rows_read,
        rows_failed: report.rows_failed,
        rows_written: enriched.len(),
        errors: report.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::load_records;
    use crate::metrics::{compute_growth, Record};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[test]
    fn test_absent_ratios_are_empty_cells() {
        let records = vec![
            Record::new(month(2023, 1), "Honda", "2W", 100),
            Record::new(month(2023, 2), "Honda", "2W", 150),
        ];
        let enriched = compute_growth_with(
            &records,
            &GrowthOptions {
                yoy_periods: 12,
                qoq_periods: 1,
                ..GrowthOptions::default()
            },
        );

        let mut buf = Vec::new();
        write_processed(&mut buf, &enriched).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Date,Manufacturer,Vehicle_Type,Registrations,YoY_Growth,QoQ_Growth,YoY_Growth_Total,QoQ_Growth_Total"
        );
        assert_eq!(lines[1], "2023-01-01,Honda,2W,100,,,,");
        assert_eq!(lines[2], "2023-02-01,Honda,2W,150,,0.5,,0.5");
    }

    #[test]
    fn test_processed_file_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed").join("vahan.csv");

        let records = vec![
            Record::new(month(2023, 1), "Hero", "2W", 500),
            Record::new(month(2023, 1), "Honda", "2W", 1000),
            Record::new(month(2023, 2), "Honda", "2W", 1100),
        ];
        let enriched = compute_growth(&records);
        write_processed_path(&path, &enriched).unwrap();

        let reloaded = load_records(&path).unwrap();
        let expected: Vec<Record> = enriched.into_iter().map(|e| e.record).collect();
        assert_eq!(reloaded, expected);
    }

    #[test]
    fn test_process_file() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        let out = dir.path().join("out").join("processed.csv");

        let mut csv_data = String::from("Date,Manufacturer,Vehicle_Type,Registrations\n");
        for m in 1..=12 {
            csv_data.push_str(&format!("2022-{:02}-01,Honda,2W,100\n", m));
        }
        csv_data.push_str("2023-01-01,Honda,2W,125\n");
        csv_data.push_str("bad,Honda,2W,1\n");
        std::fs::write(&raw, csv_data).unwrap();

        let report = process_file(&raw, &out, &GrowthOptions::default()).unwrap();
        assert_eq!(report.rows_read, 14);
        assert_eq!(report.rows_failed, 1);
        assert_eq!(report.rows_written, 13);

        let text = std::fs::read_to_string(&out).unwrap();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "2023-01-01,Honda,2W,125,0.25,0.25,0.25,0.25");
    }
}
