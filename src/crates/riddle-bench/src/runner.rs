//! Runs a single task: build prompts, call the model, return the final reply.

use crate::error::{BenchError, Result};
use crate::prompt::PromptBuilder;
use crate::retry::RetryingCaller;
use crate::task::Task;
use tracing::{debug, info_span, Instrument};

/// Executes one task against the shared model.
#[derive(Clone)]
pub struct ExperimentRunner {
    caller: RetryingCaller,
    prompts: PromptBuilder,
}

impl ExperimentRunner {
    pub fn new(caller: RetryingCaller, prompts: PromptBuilder) -> Self {
        Self { caller, prompts }
    }

    /// Run `task` and return it with the reply to its last conversation.
    ///
    /// Multi-turn strategies call the model sequentially; a failed call ends
    /// the task without issuing the next one.
    pub async fn run(&self, task: Task) -> Result<(Task, String)> {
        let span = info_span!("task", strategy = %task.strategy, iteration = task.iteration);

        async move {
            let label = task.to_string();
            let opening = self.prompts.opening(task.strategy);
            let mut reply = self.caller.call(&opening, &label).await?;

            if let Some(follow_up) = self.prompts.follow_up(task.strategy, &reply) {
                debug!(turns = follow_up.len(), "Opening reply received, sending follow-up");
                reply = self.caller.call(&follow_up, &label).await?;
            }

            debug!(chars = reply.len(), "Task reply received");
            Ok::<_, BenchError>((task, reply))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::REPEAT_BACK_SUFFIX;
    use crate::retry::RetryPolicy;
    use crate::task::Strategy;
    use crate::testing::FakeModel;
    use llm::{LlmError, Message};
    use std::sync::Arc;

    fn runner(model: Arc<FakeModel>) -> ExperimentRunner {
        let caller = RetryingCaller::new(model, RetryPolicy::default());
        ExperimentRunner::new(caller, PromptBuilder::new("Q"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_raw_makes_one_call() {
        let model = Arc::new(FakeModel::constant("42"));
        let (task, reply) = runner(model.clone())
            .run(Task::new(Strategy::Raw, 0))
            .await
            .unwrap();

        assert_eq!(task, Task::new(Strategy::Raw, 0));
        assert_eq!(reply, "42");
        assert_eq!(model.calls(), vec![vec![Message::user("Q")]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_of_thought_makes_one_call() {
        let model = Arc::new(FakeModel::constant("steps"));
        runner(model.clone())
            .run(Task::new(Strategy::ChainOfThought, 4))
            .await
            .unwrap();

        assert_eq!(
            model.calls(),
            vec![vec![Message::user("Q\nThink step-by-step.")]]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_back_makes_two_sequential_calls() {
        let model = Arc::new(FakeModel::scripted(vec![
            Ok("Understood.".into()),
            Ok("Final answer.".into()),
        ]));

        let (_, reply) = runner(model.clone())
            .run(Task::new(Strategy::RepeatBack, 0))
            .await
            .unwrap();

        assert_eq!(reply, "Final answer.");
        let calls = model.calls();
        let opening = format!("Q{}", REPEAT_BACK_SUFFIX);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![Message::user(opening.clone())]);
        assert_eq!(
            calls[1],
            vec![
                Message::user(opening),
                Message::assistant("Understood."),
                Message::user("Proceed."),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_back_stops_after_failed_opening() {
        let model = Arc::new(FakeModel::new(|_, _| {
            Err(LlmError::InvalidRequest("400".into()))
        }));

        let err = runner(model.clone())
            .run(Task::new(Strategy::RepeatBack, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Rejected(_)));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_back_retries_opening_but_never_follows_up() {
        let model = Arc::new(FakeModel::new(|_, _| {
            Err(LlmError::ServiceUnavailable("503".into()))
        }));

        let err = runner(model.clone())
            .run(Task::new(Strategy::RepeatBack, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Transient { attempts: 3, .. }));
        let calls = model.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success() {
        let model = Arc::new(FakeModel::scripted(vec![
            Err(LlmError::RateLimitExceeded("429".into())),
            Err(LlmError::Timeout("slow".into())),
            Ok("third time".into()),
        ]));

        let (_, reply) = runner(model.clone())
            .run(Task::new(Strategy::Raw, 2))
            .await
            .unwrap();

        assert_eq!(reply, "third time");
        assert_eq!(model.call_count(), 3);
    }
}
