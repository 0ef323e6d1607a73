//! Common test utilities and setup

#![allow(dead_code)]

use llm::ChatModel;
use riddle_bench::{
    ExperimentRunner, Orchestrator, PromptBuilder, ResultWriter, RetryPolicy, RetryingCaller,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Task description used by most tests; short so assertions stay readable.
pub const QUESTION: &str = "What is six times seven?";

/// Build an orchestrator writing into `dir` with the default retry policy.
pub fn orchestrator(model: Arc<dyn ChatModel>, dir: &TempDir) -> Orchestrator {
    orchestrator_with_policy(model, dir.path(), RetryPolicy::default())
}

pub fn orchestrator_with_policy(
    model: Arc<dyn ChatModel>,
    dir: &Path,
    policy: RetryPolicy,
) -> Orchestrator {
    let caller = RetryingCaller::new(model, policy);
    let runner = ExperimentRunner::new(caller, PromptBuilder::new(QUESTION));
    Orchestrator::new(runner, ResultWriter::new(dir))
}

/// Names of the files in `dir`, sorted.
pub fn artifact_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn read_artifact(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", name, e))
}
