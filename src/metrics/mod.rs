//! Registration Metrics Engine
//!
//! Pure, synchronous transforms from registration records to growth and
//! market share figures:
//!
//! - **types**: Core data structures (Record, EnrichedRecord, MarketShareRow, DateRange)
//! - **aggregate**: Grouping and period-offset ratio primitives
//! - **growth**: Per-segment and total YoY/QoQ growth
//! - **market_share**: Manufacturer share of a date window
//! - **filter**: Date/manufacturer/vehicle-type record filter
//! - **summary**: Headline KPIs over a filtered set
//!
//! # Data Flow
//!
//! ```text
//! Records → compute_growth → EnrichedRecords → RecordFilter ─┬─ compute_market_share → MarketShareRows
//!                                                            └─ summarize → Summary
//! ```
//!
//! Nothing here performs I/O or keeps state between calls; identical inputs
//! produce identical outputs, so callers may memoize freely.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use vahan::metrics::{compute_growth, compute_market_share, DateRange, Record};
//!
//! let jan = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let feb = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
//! let records = vec![
//!     Record::new(jan, "Honda", "2W", 1000),
//!     Record::new(feb, "Honda", "2W", 1100),
//!     Record::new(jan, "Hero", "2W", 500),
//!     Record::new(feb, "Hero", "2W", 600),
//! ];
//!
//! let enriched = compute_growth(&records);
//! assert_eq!(enriched.len(), 4);
//!
//! let shares = compute_market_share(&enriched, DateRange::new(jan, feb));
//! assert_eq!(shares[0].manufacturer, "Honda");
//! ```

pub mod aggregate;
pub mod filter;
pub mod growth;
pub mod market_share;
pub mod summary;
pub mod types;

pub use aggregate::{calendar_offset_ratio, group_sum, growth_ratio, positional_offset_ratio};
pub use filter::RecordFilter;
pub use growth::{compute_growth, compute_growth_with, GrowthOptions, Lookback};
pub use market_share::compute_market_share;
pub use summary::{format_count, format_growth, summarize, Summary};
pub use types::{DateRange, EnrichedRecord, MarketShareRow, Record, RegistrationRow, Segment};
