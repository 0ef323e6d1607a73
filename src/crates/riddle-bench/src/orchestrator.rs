//! Batch fan-out over the strategy x iteration grid.
//!
//! All tasks are polled together on the current task via `join_all`; nothing
//! is spawned. Every task settles before `run_all` returns, and one task's
//! failure never cancels another.

use crate::report::{BatchReport, TaskOutcome};
use crate::runner::ExperimentRunner;
use crate::task::{task_grid, Strategy, Task};
use crate::writer::ResultWriter;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// Runs a grid of tasks and persists each reply.
pub struct Orchestrator {
    runner: ExperimentRunner,
    writer: ResultWriter,
    max_concurrency: Option<usize>,
}

impl Orchestrator {
    /// Unbounded fan-out: every task is in flight at once.
    pub fn new(runner: ExperimentRunner, writer: ResultWriter) -> Self {
        Self {
            runner,
            writer,
            max_concurrency: None,
        }
    }

    /// Cap the number of tasks in flight. `None` removes the cap.
    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Run every (strategy, iteration) task and wait for all of them.
    ///
    /// Repeated strategies run once.
    pub async fn run_all(&self, strategies: &[Strategy], iterations: u32) -> BatchReport {
        let tasks = task_grid(strategies, iterations);
        let limiter = self
            .max_concurrency
            .map(|n| Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS)));
        let started_at = Utc::now();

        info!(
            tasks = tasks.len(),
            iterations,
            max_concurrency = ?self.max_concurrency,
            output_dir = %self.writer.output_dir().display(),
            "Launching experiment batch"
        );

        let outcomes = join_all(
            tasks
                .into_iter()
                .map(|task| self.run_task(task, limiter.as_ref())),
        )
        .await;

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Experiment batch settled"
        );
        report
    }

    async fn run_task(&self, task: Task, limiter: Option<&Semaphore>) -> TaskOutcome {
        // The semaphore is never closed, so acquire only fails if it were.
        let _permit = match limiter {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        };

        let result = self
            .runner
            .run(task)
            .await
            .and_then(|(task, reply)| self.writer.persist(&task, &reply));

        if let Err(e) = &result {
            error!(task = %task, kind = e.kind(), error = %e, "Task failed");
        }

        TaskOutcome { task, result }
    }
}
