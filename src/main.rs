//! Vahan CLI
//!
//! Command-line interface for the registration metrics engine:
//! - Process a raw dataset into one with growth columns
//! - Inspect growth, market share, and headline KPIs for a filtered window
//! - Generate a default config file

use anyhow::{bail, Context, Result};
use chrono::{Months, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vahan::config::{Config, LoggingConfig};
use vahan::dataset::{load_records, process_file, write_processed, DatasetLoader};
use vahan::metrics::{
    compute_growth_with, compute_market_share, format_count, format_growth, summarize, DateRange,
    EnrichedRecord, GrowthOptions, Lookback, MarketShareRow, RecordFilter, Summary,
};

#[derive(Parser)]
#[command(name = "vahan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vehicle registration growth and market share analytics")]
#[command(long_about = "Vahan derives year-over-year and quarter-over-quarter growth and\nmanufacturer market share from monthly vehicle registration data.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Record selection shared by the analysis commands
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// First date to include (YYYY-MM-DD or YYYY-MM; default: earliest in data)
    #[arg(long)]
    pub from: Option<String>,
    /// Last date to include (YYYY-MM-DD or YYYY-MM; default: latest in data)
    #[arg(long)]
    pub to: Option<String>,
    /// Manufacturers to include (repeatable; default: all)
    #[arg(short, long = "manufacturer")]
    pub manufacturers: Vec<String>,
    /// Vehicle types to include (repeatable; default: all)
    #[arg(short = 't', long = "vehicle-type")]
    pub vehicle_types: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute growth for a raw dataset and write the processed file
    Process {
        /// Raw CSV (default: data.raw_path from config)
        input: Option<PathBuf>,
        /// Output CSV (default: data.processed_path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show per-record growth
    Growth {
        /// Dataset CSV (default: data.processed_path from config)
        input: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Predecessor lookup: positional or calendar
        #[arg(long)]
        lookback: Option<Lookback>,
    },

    /// Show manufacturer market share
    Share {
        /// Dataset CSV (default: data.processed_path from config)
        input: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show headline KPIs
    Summary {
        /// Dataset CSV (default: data.processed_path from config)
        input: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A loaded, enriched, and filtered dataset
struct Selection {
    records: Vec<EnrichedRecord>,
    range: DateRange,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let config = vahan::config::generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    tracing::debug!("Vahan v{}", env!("CARGO_PKG_VERSION"));

    let mut options = config.growth.options()?;

    match cli.command {
        Commands::Process { input, output } => {
            let input = input.unwrap_or_else(|| config.data.raw_path.clone());
            let output = output.unwrap_or_else(|| config.data.processed_path.clone());

            if !input.exists() {
                eprintln!("Raw data file not found: {:?}", input);
                std::process::exit(1);
            }

            let report = process_file(&input, &output, &options)
                .with_context(|| format!("processing {:?}", input))?;

            println!("Processing results:");
            println!("  Rows read: {}", report.rows_read);
            println!("  Rows failed: {}", report.rows_failed);
            println!("  Rows written: {}", report.rows_written);

            if !report.errors.is_empty() {
                println!();
                println!("Errors (first 10):");
                for error in report.errors.iter().take(10) {
                    println!("  {}", error);
                }
            }

            println!();
            println!("Processed data saved to {:?}", output);
        }

        Commands::Growth {
            input,
            filters,
            lookback,
        } => {
            if let Some(lookback) = lookback {
                options = options.lookback(lookback);
            }
            let input = input.unwrap_or_else(|| config.data.processed_path.clone());
            let Some(selection) = select(&input, &options, &filters)? else {
                return Ok(());
            };

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&selection.records)?);
                }
                OutputFormat::Csv => {
                    write_processed(std::io::stdout().lock(), &selection.records)?;
                }
                OutputFormat::Table => print_growth_table(&selection.records),
            }
        }

        Commands::Share { input, filters } => {
            let input = input.unwrap_or_else(|| config.data.processed_path.clone());
            let Some(selection) = select(&input, &options, &filters)? else {
                return Ok(());
            };

            let shares = compute_market_share(&selection.records, selection.range);

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&shares)?);
                }
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
                    for row in &shares {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => print_share_table(&shares, selection.range),
            }
        }

        Commands::Summary { input, filters } => {
            let input = input.unwrap_or_else(|| config.data.processed_path.clone());
            let Some(selection) = select(&input, &options, &filters)? else {
                return Ok(());
            };

            // select() never returns an empty selection
            let Some(summary) = summarize(&selection.records) else {
                return Ok(());
            };

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
                    writer.serialize(&summary)?;
                    writer.flush()?;
                }
                OutputFormat::Table => print_summary(&summary),
            }
        }

        Commands::Config { .. } => unreachable!("handled before config load"),
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vahan={}", config.level)));

    let json = config.format == "json";

    // Logs go to stderr so table/json/csv output on stdout stays clean
    let pretty_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    let file_layer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Load a dataset, attach growth, and apply the command-line filters
///
/// Growth is computed over the full dataset before filtering, so a window
/// that starts mid-series still sees its predecessors.
fn select(
    input: &Path,
    options: &GrowthOptions,
    args: &FilterArgs,
) -> Result<Option<Selection>> {
    if !input.exists() {
        eprintln!("Data file not found: {:?}", input);
        eprintln!();
        eprintln!("Process a raw dataset first:");
        eprintln!("  vahan process data/raw/vahan_data_raw.csv");
        std::process::exit(1);
    }

    let records = load_records(input).with_context(|| format!("loading {:?}", input))?;
    if records.is_empty() {
        eprintln!("Data could not be loaded: {:?} has no valid records.", input);
        return Ok(None);
    }

    let enriched = compute_growth_with(&records, options);

    // covering() is Some for a non-empty set
    let Some(full) = DateRange::covering(&enriched) else {
        return Ok(None);
    };
    let start = match &args.from {
        Some(s) => parse_date_arg(s, false)?,
        None => full.start,
    };
    let end = match &args.to {
        Some(s) => parse_date_arg(s, true)?,
        None => full.end,
    };
    let range = DateRange::new(start, end);

    let mut filter = RecordFilter::new().date_range(range);
    if !args.manufacturers.is_empty() {
        filter = filter.manufacturers(args.manufacturers.iter().cloned());
    }
    if !args.vehicle_types.is_empty() {
        filter = filter.vehicle_types(args.vehicle_types.iter().cloned());
    }

    let filtered = filter.apply(&enriched);
    tracing::debug!(
        total = enriched.len(),
        selected = filtered.len(),
        range = %range,
        "Applied filters"
    );

    if filtered.is_empty() {
        eprintln!("No data available for the selected filters.");
        return Ok(None);
    }

    Ok(Some(Selection {
        records: filtered,
        range,
    }))
}

/// Parse a --from/--to date; month-only values snap to the month's
/// first day, or its last day when `end_of_month` is set
fn parse_date_arg(s: &str, end_of_month: bool) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(first) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        if !end_of_month {
            return Ok(first);
        }
        if let Some(last) = first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
        {
            return Ok(last);
        }
    }

    match DatasetLoader::new().parse_date(s) {
        Some(date) => Ok(date),
        None => bail!("Invalid date: {}. Use YYYY-MM-DD or YYYY-MM", s),
    }
}

fn print_growth_table(records: &[EnrichedRecord]) {
    println!(
        "{:<12} {:<15} {:<8} {:>13} {:>10} {:>10} {:>10} {:>10}",
        "Date", "Manufacturer", "Type", "Registrations", "YoY", "QoQ", "YoY Total", "QoQ Total"
    );
    println!("{}", "-".repeat(95));

    for row in records {
        println!(
            "{:<12} {:<15} {:<8} {:>13} {:>10} {:>10} {:>10} {:>10}",
            row.record.date.format("%Y-%m-%d"),
            row.record.manufacturer,
            row.record.vehicle_type,
            format_count(row.record.registrations),
            format_growth(row.yoy_growth),
            format_growth(row.qoq_growth),
            format_growth(row.yoy_growth_total),
            format_growth(row.qoq_growth_total),
        );
    }
}

fn print_share_table(rows: &[MarketShareRow], range: DateRange) {
    if rows.is_empty() {
        println!("No data to display market share");
        return;
    }

    println!("Market Share by Manufacturer ({})", range);
    println!();
    println!("{:<20} {:>15} {:>10}", "Manufacturer", "Registrations", "Share");
    println!("{}", "-".repeat(47));

    for row in rows {
        println!(
            "{:<20} {:>15} {:>9.2}%",
            row.manufacturer,
            format_count(row.registrations),
            row.market_share_pct
        );
    }
}

fn print_summary(summary: &Summary) {
    println!(
        "Performance Overview ({} to {})",
        summary.first_date.format("%Y-%m-%d"),
        summary.last_date.format("%Y-%m-%d")
    );
    println!();
    println!(
        "  Total Registrations: {}",
        format_count(summary.total_registrations)
    );
    println!(
        "  Overall YoY Growth:  {}",
        format_growth(summary.latest_yoy_growth_total)
    );
    println!(
        "  Overall QoQ Growth:  {}",
        format_growth(summary.latest_qoq_growth_total)
    );
    println!("  Top Manufacturer:    {}", summary.top_manufacturer);
    println!("  Records:             {}", summary.record_count);
}
