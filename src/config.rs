//! Configuration loading using Figment.
//!
//! Configuration is loaded from:
//! 1. `config/daq_scan.toml` (optional; defaults apply when absent)
//! 2. Environment variables prefixed with `DAQ_SCAN_`, nested with `__`
//!
//! # Example
//! ```no_run
//! use daq_scan::config::ScanConfig;
//!
//! let config = ScanConfig::load()?;
//! println!("Step limit: {}", config.scan.steps_limit);
//! # Ok::<(), daq_scan::error::ScanError>(())
//! ```
//!
//! ```toml
//! [application]
//! name = "Scan builder"
//! log_level = "debug"
//!
//! [scan]
//! steps_limit = 20000
//! traversal = "snake"
//! seed = 7
//! ```
//!
//! `DAQ_SCAN_SCAN__STEPS_LIMIT=500` overrides `scan.steps_limit`.

use crate::engine::TraversalMode;
use crate::error::{ScanError, ScanResult};
use crate::guard::DEFAULT_STEPS_LIMIT;
use crate::tracing_setup::{parse_log_level, OutputFormat};
use crate::transform::ROUND_DECIMALS;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/daq_scan.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DAQ_SCAN_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Scan engine settings
    #[serde(default)]
    pub scan: ScanSettings,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log rendering (pretty, compact, json)
    #[serde(default)]
    pub log_format: OutputFormat,
}

/// Scan engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Maximum number of steps a scan may have
    #[serde(default = "default_steps_limit")]
    pub steps_limit: usize,
    /// Rows shown in a position table before it is cut off
    #[serde(default = "default_table_preview_rows")]
    pub table_preview_rows: usize,
    /// Fractional digits kept by the rounding pass
    #[serde(default = "default_round_decimals")]
    pub round_decimals: u32,
    /// Seed for the randomize transform (OS entropy when unset)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Trajectory traversal
    #[serde(default)]
    pub traversal: TraversalMode,
}

// Default value functions
fn default_name() -> String {
    "daq-scan".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_steps_limit() -> usize {
    DEFAULT_STEPS_LIMIT
}

fn default_table_preview_rows() -> usize {
    500
}

fn default_round_decimals() -> u32 {
    ROUND_DECIMALS
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_format: OutputFormat::default(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            steps_limit: default_steps_limit(),
            table_preview_rows: default_table_preview_rows(),
            round_decimals: default_round_decimals(),
            seed: None,
            traversal: TraversalMode::default(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from the default file and environment variables.
    pub fn load() -> ScanResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path plus environment.
    ///
    /// A missing file is not an error; the defaults fill in.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let config: ScanConfig = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> ScanResult<()> {
        parse_log_level(&self.application.log_level)?;

        if self.scan.steps_limit == 0 {
            return Err(ScanError::Configuration(
                "steps_limit must be greater than 0".to_string(),
            ));
        }

        if self.scan.table_preview_rows == 0 {
            return Err(ScanError::Configuration(
                "table_preview_rows must be greater than 0".to_string(),
            ));
        }

        if self.scan.round_decimals > 15 {
            return Err(ScanError::Configuration(format!(
                "Invalid round_decimals {}. Must be 0-15",
                self.scan.round_decimals
            )));
        }

        Ok(())
    }
}
