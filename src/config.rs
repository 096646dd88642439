//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::metrics::{GrowthOptions, Lookback};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub growth: GrowthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dataset locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_raw_path")]
    pub raw_path: PathBuf,

    #[serde(default = "default_processed_path")]
    pub processed_path: PathBuf,
}

fn default_raw_path() -> PathBuf {
    PathBuf::from("data/raw/vahan_data_raw.csv")
}

fn default_processed_path() -> PathBuf {
    PathBuf::from("data/processed/vahan_data_processed.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            processed_path: default_processed_path(),
        }
    }
}

/// Growth computation settings
#[derive(Debug, Clone, Deserialize)]
pub struct GrowthConfig {
    #[serde(default = "default_yoy_periods")]
    pub yoy_periods: u32,

    #[serde(default = "default_qoq_periods")]
    pub qoq_periods: u32,

    #[serde(default)]
    pub lookback: Lookback,
}

fn default_yoy_periods() -> u32 {
    12
}

fn default_qoq_periods() -> u32 {
    3
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            yoy_periods: default_yoy_periods(),
            qoq_periods: default_qoq_periods(),
            lookback: Lookback::default(),
        }
    }
}

impl GrowthConfig {
    /// Convert to engine options, rejecting zero offsets
    pub fn options(&self) -> Result<GrowthOptions, ConfigError> {
        if self.yoy_periods == 0 || self.qoq_periods == 0 {
            return Err(ConfigError::Invalid(
                "growth periods must be at least 1".to_string(),
            ));
        }

        Ok(GrowthOptions {
            yoy_periods: self.yoy_periods,
            qoq_periods: self.qoq_periods,
            lookback: self.lookback,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter level for the `vahan` target, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stderr output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// File that log lines are also appended to, without ANSI colors
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("vahan").join("config.toml")),
            Some(PathBuf::from("/etc/vahan/config.toml")),
            Some(PathBuf::from("./vahan.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Data overrides
        if let Ok(path) = std::env::var("VAHAN_RAW_PATH") {
            self.data.raw_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("VAHAN_PROCESSED_PATH") {
            self.data.processed_path = PathBuf::from(path);
        }

        // Growth overrides
        if let Ok(lookback) = std::env::var("VAHAN_LOOKBACK") {
            match lookback.parse() {
                Ok(l) => self.growth.lookback = l,
                Err(e) => tracing::warn!("Ignoring VAHAN_LOOKBACK: {}", e),
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("VAHAN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("VAHAN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Vahan Registration Metrics Configuration
#
# Environment variables override these settings:
# - VAHAN_RAW_PATH
# - VAHAN_PROCESSED_PATH
# - VAHAN_LOOKBACK
# - VAHAN_LOG_LEVEL
# - VAHAN_LOG_FORMAT

[data]
# Raw registrations CSV (Date,Manufacturer,Vehicle_Type,Registrations)
raw_path = "data/raw/vahan_data_raw.csv"

# Where `vahan process` writes records with growth columns
processed_path = "data/processed/vahan_data_processed.csv"

[growth]
# Periods back for year-over-year growth
yoy_periods = 12

# Periods back for quarter-over-quarter growth
qoq_periods = 3

# positional: compare with the Nth earlier observation in the series
# calendar: compare with the observation dated exactly N months earlier
lookback = "positional"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/vahan/vahan.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(
            config.data.raw_path,
            PathBuf::from("data/raw/vahan_data_raw.csv")
        );
        assert_eq!(config.growth.yoy_periods, 12);
        assert_eq!(config.growth.qoq_periods, 3);
        assert_eq!(config.growth.lookback, Lookback::Positional);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.growth.options().unwrap(), GrowthOptions::default());
        assert_eq!(
            config.data.processed_path,
            PathBuf::from("data/processed/vahan_data_processed.csv")
        );
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
[growth]
lookback = "calendar"
"#,
        )
        .unwrap();

        assert_eq!(config.growth.lookback, Lookback::Calendar);
        assert_eq!(config.growth.yoy_periods, 12);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_periods_rejected() {
        let config = Config::parse("[growth]\nqoq_periods = 0\n").unwrap();
        assert!(matches!(
            config.growth.options(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vahan.toml");
        std::fs::write(&path, "[data]\nraw_path = \"in.csv\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data.raw_path, PathBuf::from("in.csv"));

        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
