//! Configuration management for riddle-bench
//!
//! Supports dual-location configuration:
//! - User-level: ~/.riddle-bench/riddle-bench.toml
//! - Project-level: ./riddle-bench.toml
//!
//! Project-level config overrides user-level config key by key.

mod loader;
mod schema;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use schema::{
    BenchConfig, ExperimentConfig, LlmConfig, LogFormat, LoggingConfig, Overrides, RetryConfig,
};
