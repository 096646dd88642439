//! Registration Dataset I/O
//!
//! Moves records between CSV files and the metrics engine:
//!
//! - **loader**: Parse `Date,Manufacturer,Vehicle_Type,Registrations` CSV into records
//! - **writer**: Write enriched records with growth columns; raw → processed pipeline
//! - **error**: Error types
//!
//! ```text
//! raw.csv → DatasetLoader → Records → compute_growth → write_processed → processed.csv
//! ```

pub mod error;
pub mod loader;
pub mod writer;

pub use error::{DatasetError, DatasetResult};
pub use loader::{load_records, DatasetLoader, LoadReport};
pub use writer::{
    process_file, write_processed, write_processed_path, ProcessReport, PROCESSED_HEADERS,
};
