//! Tracing initialisation.
//!
//! Level and output format come from the `[application]` section of
//! [`ScanConfig`]. `RUST_LOG`, when set, replaces the configured level with a
//! full filter directive. Events are written to stderr so the CLI's stdout
//! carries only tables and JSON.
//!
//! ```no_run
//! use daq_scan::{config::ScanConfig, tracing_setup};
//!
//! let config = ScanConfig::load()?;
//! tracing_setup::init_from_config(&config)?;
//! tracing::info!("Scan builder started");
//! # Ok::<(), daq_scan::error::ScanError>(())
//! ```

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Accepted `log_level` values.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event, for log collectors
    Json,
}

/// Resolved subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Maximum verbosity when `RUST_LOG` is unset
    pub level: Level,
    /// Event rendering
    pub format: OutputFormat,
    /// Source file and line on every event
    pub with_file_and_line: bool,
    /// Colour escapes (pretty format only)
    pub with_ansi: bool,
}

impl TracingConfig {
    /// Settings for `config`. Source locations are added at debug and
    /// trace; colour only when stderr is a terminal.
    pub fn from_scan_config(config: &ScanConfig) -> ScanResult<Self> {
        let level = parse_log_level(&config.application.log_level)?;
        let format = config.application.log_format;
        Ok(Self {
            level,
            format,
            with_file_and_line: level >= Level::DEBUG,
            with_ansi: format == OutputFormat::Pretty && std::io::stderr().is_terminal(),
        })
    }
}

/// Install the global subscriber described by `config`.
pub fn init_from_config(config: &ScanConfig) -> ScanResult<()> {
    init(&TracingConfig::from_scan_config(config)?)
}

/// Install a global subscriber.
///
/// Returns `Ok(())` without touching anything when a dispatcher is already in
/// place, so a host that set up its own logging keeps it.
pub fn init(config: &TracingConfig) -> ScanResult<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_file_and_line)
        .with_line_number(config.with_file_and_line);
    let layer = match config.format {
        OutputFormat::Pretty => base.pretty().with_ansi(config.with_ansi).boxed(),
        OutputFormat::Compact => base.compact().with_ansi(false).boxed(),
        OutputFormat::Json => base.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| ScanError::Configuration(format!("cannot install tracing subscriber: {e}")))
}

/// Case-insensitive level name to [`Level`].
pub fn parse_log_level(level: &str) -> ScanResult<Level> {
    let invalid = || {
        ScanError::Configuration(format!(
            "Invalid log_level '{}'. Must be one of: {}",
            level,
            LOG_LEVELS.join(", ")
        ))
    };
    // Level::from_str also takes "1".."5"; only names are allowed in config.
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        return Err(invalid());
    }
    Level::from_str(level).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_names() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("Error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_rejects_numbers_and_junk() {
        for bad in ["3", "verbose", ""] {
            let err = parse_log_level(bad).unwrap_err();
            assert!(matches!(err, ScanError::Configuration(_)), "{bad}");
        }
    }

    #[test]
    fn test_settings_follow_application_config() {
        let mut config = ScanConfig::default();
        let settings = TracingConfig::from_scan_config(&config).unwrap();
        assert_eq!(settings.level, Level::INFO);
        assert_eq!(settings.format, OutputFormat::Compact);
        assert!(!settings.with_file_and_line);
        assert!(!settings.with_ansi);

        config.application.log_level = "trace".to_string();
        config.application.log_format = OutputFormat::Json;
        let settings = TracingConfig::from_scan_config(&config).unwrap();
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.with_file_and_line);
        assert!(!settings.with_ansi);
    }

    #[test]
    fn test_output_format_names() {
        let format: OutputFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(format, OutputFormat::Pretty);
        assert_eq!(serde_json::to_string(&OutputFormat::Json).unwrap(), "\"json\"");
    }
}
