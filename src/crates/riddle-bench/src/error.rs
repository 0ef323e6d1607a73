//! Error types for riddle-bench.

use llm::LlmError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for riddle-bench operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised while configuring or running an experiment batch.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The remote call kept failing until the retry policy gave up.
    #[error("remote call failed after {attempts} attempt(s): {source}")]
    Transient {
        attempts: u32,
        #[source]
        source: LlmError,
    },

    /// The remote call failed with an error the policy does not retry.
    #[error("remote call rejected: {0}")]
    Rejected(#[source] LlmError),

    /// Missing credential or unusable configuration; nothing was run.
    #[error("Configuration error: {0}")]
    Fatal(String),

    /// An artifact could not be persisted.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    /// Short machine-friendly label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            BenchError::Transient { .. } => "transient",
            BenchError::Rejected(_) => "rejected",
            BenchError::Fatal(_) => "fatal",
            BenchError::Io { .. } => "io",
        }
    }
}

impl From<LlmError> for BenchError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ApiKeyNotFound(_) | LlmError::ConfigError(_) => {
                BenchError::Fatal(err.to_string())
            }
            other => BenchError::Rejected(other),
        }
    }
}
