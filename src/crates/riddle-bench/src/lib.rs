//! # riddle-bench
//!
//! Runs a fixed reasoning riddle against a remote chat model under several
//! prompting strategies, many times each, and writes every final reply to
//! its own file for offline comparison.
//!
//! ## Strategies
//!
//! - **raw** - the task description as-is
//! - **cot** - the description plus "Think step-by-step."
//! - **rb** - the model first restates the task, then is told to proceed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use riddle_bench::{
//!     ExperimentRunner, Orchestrator, PromptBuilder, ResultWriter, RetryPolicy,
//!     RetryingCaller, Strategy,
//! };
//! use llm::{remote::ClaudeClient, RemoteLlmConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ClaudeClient::new(RemoteLlmConfig::from_env(
//!     "ANTHROPIC_API_KEY",
//!     "https://api.anthropic.com",
//!     "claude-3-5-sonnet-latest",
//! )?)?;
//!
//! let caller = RetryingCaller::new(Arc::new(client), RetryPolicy::default());
//! let runner = ExperimentRunner::new(caller, PromptBuilder::default());
//! let report = Orchestrator::new(runner, ResultWriter::new("results"))
//!     .run_all(&Strategy::ALL, 50)
//!     .await;
//!
//! println!("{} of {} succeeded", report.succeeded(), report.total());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod retry;
pub mod runner;
pub mod task;
pub mod writer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

mod error;

// Error types
pub use error::{BenchError, Result};

pub use config::{BenchConfig, ConfigLoader, Overrides};
pub use orchestrator::Orchestrator;
pub use prompt::{PromptBuilder, RIVER_RIDDLE};
pub use report::{BatchReport, TaskOutcome};
pub use retry::{with_retry, RetryOn, RetryPolicy, RetryingCaller};
pub use runner::ExperimentRunner;
pub use task::{task_grid, Strategy, Task};
pub use writer::ResultWriter;
