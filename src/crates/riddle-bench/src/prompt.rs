//! Prompt construction for each strategy.
//!
//! Every conversation is built from scratch. The repeat-back follow-up is a
//! new three-turn conversation, not the opening one with turns appended.

use crate::error::{BenchError, Result};
use crate::task::Strategy;
use llm::{Conversation, Message};
use std::path::Path;

/// The river-crossing riddle sent in every experiment unless overridden.
pub const RIVER_RIDDLE: &str = concat!(
    "\nAnswer the following riddle:\n\n",
    "A farmer wants to cross a river and take with him a wolf, a goat and a cabbage. \n",
    "He has a boat with three secure separate compartments. ",
    "If the wolf and the goat are alone on one shore, the wolf will eat the goat. \n",
    "If the goat and the cabbage are alone on the shore, the goat will eat the cabbage. \n",
    "How can the farmer efficiently bring the wolf, the goat and the cabbage across the river ",
    "without anything being eaten?\n",
);

/// Appended for the chain-of-thought strategy.
pub const CHAIN_OF_THOUGHT_SUFFIX: &str = "\nThink step-by-step.";

/// Appended to the opening turn of the repeat-back strategy.
pub const REPEAT_BACK_SUFFIX: &str = "\nBut before you do, please explain the task that I've asked you to perform to confirm your understanding.";

/// Final user turn of the repeat-back follow-up.
pub const PROCEED: &str = "Proceed.";

/// Builds the conversations each strategy submits.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    task_description: String,
}

impl PromptBuilder {
    pub fn new(task_description: impl Into<String>) -> Self {
        Self {
            task_description: task_description.into(),
        }
    }

    /// Read the task description from a file. The content is used verbatim.
    pub fn from_file(path: &Path) -> Result<Self> {
        let description = std::fs::read_to_string(path).map_err(|e| {
            BenchError::Fatal(format!(
                "failed to read task file {}: {}",
                path.display(),
                e
            ))
        })?;

        if description.trim().is_empty() {
            return Err(BenchError::Fatal(format!(
                "task file {} is empty",
                path.display()
            )));
        }
        Ok(Self::new(description))
    }

    /// First conversation submitted for a strategy.
    pub fn opening(&self, strategy: Strategy) -> Conversation {
        vec![Message::user(self.opening_turn(strategy))]
    }

    /// Conversation to submit after the opening reply, if the strategy has one.
    pub fn follow_up(&self, strategy: Strategy, reply: &str) -> Option<Conversation> {
        match strategy {
            Strategy::RepeatBack => Some(vec![
                Message::user(self.opening_turn(strategy)),
                Message::assistant(reply),
                Message::user(PROCEED),
            ]),
            Strategy::Raw | Strategy::ChainOfThought => None,
        }
    }

    fn opening_turn(&self, strategy: Strategy) -> String {
        match strategy {
            Strategy::Raw => self.task_description.clone(),
            Strategy::ChainOfThought => {
                format!("{}{}", self.task_description, CHAIN_OF_THOUGHT_SUFFIX)
            }
            Strategy::RepeatBack => format!("{}{}", self.task_description, REPEAT_BACK_SUFFIX),
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(RIVER_RIDDLE)
    }
}
