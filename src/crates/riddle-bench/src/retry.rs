//! Retry logic with exponential backoff
//!
//! A [`RetryPolicy`] is a plain value: attempt budget, backoff shape and which
//! errors qualify for another attempt. [`with_retry`] applies it to any async
//! operation returning an [`LlmError`]; [`RetryingCaller`] binds it to a
//! shared [`ChatModel`].

use crate::error::{BenchError, Result};
use llm::{ChatModel, LlmError, Message};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Which failures earn another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryOn {
    /// Only errors the backend reports as retryable (network, 429, 5xx, timeouts).
    #[default]
    Transient,
    /// Every error, including ones that can never succeed.
    All,
}

/// Retry policy
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Scale applied to `2^(n-1)` seconds after the n-th failure
    pub multiplier: f64,

    /// Lower bound for any single delay
    pub min_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            retry_on: RetryOn::Transient,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default backoff and a custom attempt budget
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Set the backoff shape
    pub fn with_backoff(mut self, multiplier: f64, min_delay: Duration, max_delay: Duration) -> Self {
        self.multiplier = multiplier;
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Set retry eligibility
    pub fn with_retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }

    /// Delay to wait after the given attempt (1-based) failed
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let raw_secs = self.multiplier * 2f64.powi(exponent);
        let secs = raw_secs
            .min(self.max_delay.as_secs_f64())
            .max(self.min_delay.as_secs_f64());

        Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
    }

    /// Whether this error qualifies for another attempt
    pub fn should_retry(&self, error: &LlmError) -> bool {
        match self.retry_on {
            RetryOn::All => true,
            RetryOn::Transient => error.is_retryable(),
        }
    }
}

/// Execute an operation under a retry policy
///
/// # Arguments
/// * `policy` - Retry policy
/// * `label` - Identifier for logging
/// * `operation` - Async function to execute; called once per attempt
///
/// # Returns
/// The first successful value, [`BenchError::Rejected`] for an error the
/// policy does not retry, or [`BenchError::Transient`] once attempts run out.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = llm::Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = %label, attempt, "Retry succeeded");
                }
                return Ok(value);
            }
            Err(e) if !policy.should_retry(&e) => {
                warn!(
                    operation = %label,
                    attempt,
                    error = %e,
                    "Operation failed with non-retryable error"
                );
                return Err(BenchError::Rejected(e));
            }
            Err(e) if attempt >= max_attempts => {
                warn!(
                    operation = %label,
                    attempt,
                    error = %e,
                    "Operation failed, max attempts exhausted"
                );
                return Err(BenchError::Transient {
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                let delay = policy.backoff_delay(attempt);
                warn!(
                    operation = %label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, will retry"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// A shared chat model wrapped in a retry policy.
#[derive(Clone)]
pub struct RetryingCaller {
    model: Arc<dyn ChatModel>,
    policy: RetryPolicy,
}

impl RetryingCaller {
    pub fn new(model: Arc<dyn ChatModel>, policy: RetryPolicy) -> Self {
        Self { model, policy }
    }

    /// Send one conversation, retrying per policy, and return the reply text.
    pub async fn call(&self, conversation: &[Message], label: &str) -> Result<String> {
        with_retry(&self.policy, label, || self.model.complete(conversation)).await
    }
}
