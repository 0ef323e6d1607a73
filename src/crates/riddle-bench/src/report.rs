//! Per-task outcomes of a settled batch.

use crate::error::{BenchError, Result};
use crate::task::{Strategy, Task};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What happened to one task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub task: Task,
    /// Artifact path on success.
    pub result: Result<PathBuf>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every task's outcome plus batch timing. Built once all tasks settle.
#[derive(Debug)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TaskOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Failed tasks with their errors, in grid order.
    pub fn failures(&self) -> impl Iterator<Item = (&Task, &BenchError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.task, e)))
    }

    /// Outcome for a specific task, if it was part of the batch.
    pub fn outcome(&self, task: &Task) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| &o.task == task)
    }

    /// Human-readable failure listing for stderr.
    pub fn failure_summary(&self) -> String {
        let mut out = format!(
            "{} of {} task(s) failed:\n",
            self.failed(),
            self.total()
        );
        for (task, error) in self.failures() {
            let _ = writeln!(out, "  {} ({}): {}", task.artifact_name(), error.kind(), error);
        }
        out
    }

    /// Serializable view of the report.
    pub fn document(&self) -> ReportDocument {
        ReportDocument {
            started_at: self.started_at,
            finished_at: self.finished_at,
            total: self.total(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            tasks: self
                .outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(path) => ReportEntry {
                        strategy: o.task.strategy,
                        iteration: o.task.iteration,
                        status: "ok",
                        artifact: Some(path.display().to_string()),
                        error_kind: None,
                        error: None,
                    },
                    Err(e) => ReportEntry {
                        strategy: o.task.strategy,
                        iteration: o.task.iteration,
                        status: "failed",
                        artifact: None,
                        error_kind: Some(e.kind()),
                        error: Some(e.to_string()),
                    },
                })
                .collect(),
        }
    }

    /// Process exit status for the settled batch: 0 when every task
    /// succeeded, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Write the JSON report to `report_path`, if given, and return the exit
    /// status. A report that cannot be written is logged; the status still
    /// reflects only the tasks.
    pub fn conclude(&self, report_path: Option<&Path>) -> u8 {
        if let Some(path) = report_path {
            match self.write_json(path) {
                Ok(()) => info!(path = %path.display(), "Batch report written"),
                Err(e) => error!(path = %path.display(), error = %e, "Failed to write batch report"),
            }
        }
        self.exit_status()
    }

    /// Write the report as pretty JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.document())
            .map_err(|e| BenchError::Fatal(format!("failed to serialize report: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| BenchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| BenchError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// JSON shape of a [`BatchReport`].
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub tasks: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub strategy: Strategy,
    pub iteration: u32,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
