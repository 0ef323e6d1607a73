//! Units of work: a prompting strategy paired with an iteration index.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Prompting variant applied to the task description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// The task description, verbatim.
    Raw,
    /// The task description plus a step-by-step nudge.
    ChainOfThought,
    /// Ask the model to restate the task, then tell it to proceed.
    RepeatBack,
}

impl Strategy {
    /// Every strategy, in reporting order.
    pub const ALL: [Strategy; 3] = [Strategy::Raw, Strategy::ChainOfThought, Strategy::RepeatBack];

    /// Short tag used in artifact names and on the command line.
    pub fn tag(&self) -> &'static str {
        match self {
            Strategy::Raw => "raw",
            Strategy::ChainOfThought => "cot",
            Strategy::RepeatBack => "rb",
        }
    }

    /// Number of remote calls one task of this strategy makes.
    pub fn turns(&self) -> usize {
        match self {
            Strategy::RepeatBack => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(Strategy::Raw),
            "cot" | "chain_of_thought" | "chain-of-thought" => Ok(Strategy::ChainOfThought),
            "rb" | "repeat_back" | "repeat-back" => Ok(Strategy::RepeatBack),
            other => Err(format!(
                "unknown strategy '{}' (expected raw, cot or rb)",
                other
            )),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.tag().to_string()
    }
}

/// One (strategy, iteration) pair. Consumed once by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub strategy: Strategy,
    pub iteration: u32,
}

impl Task {
    pub fn new(strategy: Strategy, iteration: u32) -> Self {
        Self {
            strategy,
            iteration,
        }
    }

    /// Deterministic artifact file name for this task.
    pub fn artifact_name(&self) -> String {
        format!("prompt-{}-result-{}.txt", self.strategy.tag(), self.iteration)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.strategy, self.iteration)
    }
}

/// Full strategy x iteration grid, strategy-major.
///
/// A strategy listed more than once contributes its tasks only at its first
/// position, so every task (and artifact) in the grid is distinct.
pub fn task_grid(strategies: &[Strategy], iterations: u32) -> Vec<Task> {
    let mut seen = HashSet::new();
    strategies
        .iter()
        .filter(|strategy| seen.insert(**strategy))
        .flat_map(|&strategy| (0..iterations).map(move |i| Task::new(strategy, i)))
        .collect()
}
