//! # Vahan
//!
//! Vehicle registration analytics - derives period-over-period growth and
//! market share from monthly registration counts.
//!
//! ## Features
//!
//! - **Growth metrics**: YoY and QoQ growth per (manufacturer, vehicle type)
//!   segment and for the all-segment total, broadcast to every record
//! - **Market share**: Manufacturer share of any inclusive date window
//! - **Gap handling**: Positional lookback (default) or calendar lookback
//! - **CSV I/O**: Tolerant loader and processed-file writer
//!
//! ## Modules
//!
//! - [`metrics`]: The pure calculation engine
//! - [`dataset`]: CSV loading and writing
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vahan::dataset::load_records;
//! use vahan::metrics::{compute_growth, compute_market_share, summarize, DateRange};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = load_records(Path::new("data/raw/vahan_data_raw.csv"))?;
//!     let enriched = compute_growth(&records);
//!
//!     if let Some(range) = DateRange::covering(&enriched) {
//!         for row in compute_market_share(&enriched, range) {
//!             println!("{}: {:.2}%", row.manufacturer, row.market_share_pct);
//!         }
//!     }
//!
//!     if let Some(summary) = summarize(&enriched) {
//!         println!("Top manufacturer: {}", summary.top_manufacturer);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod metrics;

// Re-export top-level types for convenience
pub use metrics::{
    compute_growth, compute_growth_with, compute_market_share, group_sum,
    positional_offset_ratio, summarize, DateRange, EnrichedRecord, GrowthOptions, Lookback,
    MarketShareRow, Record, RecordFilter, Summary,
};

pub use dataset::{DatasetError, DatasetLoader, DatasetResult};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
