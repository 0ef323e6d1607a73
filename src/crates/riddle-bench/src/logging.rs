//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays free for command output. `RUST_LOG`
//! wins over everything; otherwise the configured level applies, raised by
//! `-v` (debug) and `-vv` (trace).

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{BenchError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive for the given config level and CLI verbosity count.
pub fn effective_level(config_level: &str, verbosity: u8) -> String {
    match verbosity {
        0 => config_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn build_filter(config: &LoggingConfig, verbosity: u8) -> Result<EnvFilter> {
    if std::env::var("RUST_LOG").is_ok() {
        return Ok(EnvFilter::from_default_env());
    }
    let directive = effective_level(&config.level, verbosity);
    EnvFilter::try_new(&directive)
        .map_err(|e| BenchError::Fatal(format!("Invalid log level '{}': {}", directive, e)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) -> Result<()> {
    let filter = build_filter(config, verbosity)?;
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| BenchError::Fatal(format!("Failed to initialize logging: {}", e)))
}
