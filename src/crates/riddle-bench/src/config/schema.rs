//! Configuration schema for riddle-bench

use crate::error::{BenchError, Result};
use crate::retry::{RetryOn, RetryPolicy};
use crate::task::Strategy;
use llm::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use llm::RemoteLlmConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BenchConfig {
    /// Model and credential settings
    pub llm: LlmConfig,

    /// Grid and output settings
    pub experiment: ExperimentConfig,

    /// Retry policy for each remote call
    pub retry: RetryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name
    pub model: String,

    /// Maximum tokens to generate per reply
    pub max_tokens: u32,

    /// API base URL
    pub api_base: String,

    /// Explicit API key (supports `${VAR}` interpolation); wins over `api_key_env`
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Per-request deadline in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            api_base: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Experiment grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Trials per strategy
    pub iterations: u32,

    /// Strategies to run, by tag (`raw`, `cot`, `rb`)
    pub strategies: Vec<Strategy>,

    /// Directory receiving one artifact per task
    pub output_dir: PathBuf,

    /// Maximum tasks in flight; unset means the whole grid at once
    pub max_concurrency: Option<usize>,

    /// File whose content replaces the built-in riddle
    pub task_file: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            strategies: Strategy::ALL.to_vec(),
            output_dir: PathBuf::from("results"),
            max_concurrency: None,
            task_file: None,
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per remote call
    pub max_attempts: u32,

    /// Backoff multiplier
    pub multiplier: f64,

    /// Backoff floor in seconds
    pub min_delay_secs: f64,

    /// Backoff ceiling in seconds
    pub max_delay_secs: f64,

    /// `transient` or `all`
    pub retry_on: RetryOn,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_delay_secs: 4.0,
            max_delay_secs: 10.0,
            retry_on: RetryOn::Transient,
        }
    }
}

impl RetryConfig {
    /// Validate and convert into a [`RetryPolicy`].
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        if self.max_attempts == 0 {
            return Err(BenchError::Fatal(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        let min_delay = secs("retry.min_delay_secs", self.min_delay_secs)?;
        let max_delay = secs("retry.max_delay_secs", self.max_delay_secs)?;
        if min_delay > max_delay {
            return Err(BenchError::Fatal(format!(
                "retry.min_delay_secs ({}) exceeds retry.max_delay_secs ({})",
                self.min_delay_secs, self.max_delay_secs
            )));
        }
        if !(self.multiplier.is_finite() && self.multiplier >= 0.0) {
            return Err(BenchError::Fatal(format!(
                "retry.multiplier must be a non-negative number, got {}",
                self.multiplier
            )));
        }

        Ok(RetryPolicy::new(self.max_attempts)
            .with_backoff(self.multiplier, min_delay, max_delay)
            .with_retry_on(self.retry_on))
    }
}

fn secs(field: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| BenchError::Fatal(format!("{} must be a non-negative number, got {}", field, value)))
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: "trace", "debug", "info", "warn", "error"
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Command-line values that take precedence over config files.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub iterations: Option<u32>,
    pub strategies: Vec<Strategy>,
    pub output_dir: Option<PathBuf>,
    pub max_concurrency: Option<usize>,
    pub task_file: Option<PathBuf>,
}

impl BenchConfig {
    /// Apply command-line overrides. Empty/absent values leave the config as is.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(iterations) = overrides.iterations {
            self.experiment.iterations = iterations;
        }
        if !overrides.strategies.is_empty() {
            self.experiment.strategies = overrides.strategies;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.experiment.output_dir = output_dir;
        }
        if overrides.max_concurrency.is_some() {
            self.experiment.max_concurrency = overrides.max_concurrency;
        }
        if overrides.task_file.is_some() {
            self.experiment.task_file = overrides.task_file;
        }
    }

    /// Resolve environment variables in configuration values
    ///
    /// Supports ${VAR_NAME} syntax in `llm.api_key` and `llm.api_base`
    pub fn resolve_env_vars(&mut self) {
        if let Some(ref api_key) = self.llm.api_key {
            self.llm.api_key = Some(Self::expand_env_var(api_key));
        }
        self.llm.api_base = Self::expand_env_var(&self.llm.api_base);
    }

    /// Expand environment variable in a string; unresolved values are kept
    fn expand_env_var(value: &str) -> String {
        match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
            Some(var_name) => std::env::var(var_name).unwrap_or_else(|_| value.to_string()),
            None => value.to_string(),
        }
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.experiment.strategies.is_empty() {
            return Err(BenchError::Fatal(
                "experiment.strategies must name at least one strategy".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(repeated) = self
            .experiment
            .strategies
            .iter()
            .find(|strategy| !seen.insert(**strategy))
        {
            return Err(BenchError::Fatal(format!(
                "experiment.strategies lists '{}' more than once",
                repeated
            )));
        }
        match self.experiment.max_concurrency {
            Some(0) => {
                return Err(BenchError::Fatal(
                    "experiment.max_concurrency must be at least 1 when set".to_string(),
                ));
            }
            Some(n) if n > Semaphore::MAX_PERMITS => {
                return Err(BenchError::Fatal(format!(
                    "experiment.max_concurrency must be at most {}, got {}",
                    Semaphore::MAX_PERMITS,
                    n
                )));
            }
            _ => {}
        }
        if self.llm.max_tokens == 0 {
            return Err(BenchError::Fatal("llm.max_tokens must be at least 1".to_string()));
        }
        self.retry.to_policy().map(|_| ())
    }

    /// Build the client configuration, resolving the credential.
    ///
    /// A missing credential is fatal: nothing should run without it.
    pub fn remote_llm_config(&self) -> Result<RemoteLlmConfig> {
        let explicit = self
            .llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"));

        let config = match explicit {
            Some(key) => RemoteLlmConfig::new(key, &self.llm.api_base, &self.llm.model),
            None => RemoteLlmConfig::from_env(&self.llm.api_key_env, &self.llm.api_base, &self.llm.model)
                .map_err(|_| {
                    BenchError::Fatal(format!(
                        "API key not found: set {} or llm.api_key",
                        self.llm.api_key_env
                    ))
                })?,
        };

        Ok(config
            .with_timeout(Duration::from_secs(self.llm.timeout_secs))
            .with_max_tokens(self.llm.max_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.llm.model, "claude-3-5-sonnet-latest");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.experiment.iterations, 50);
        assert_eq!(config.experiment.strategies, Strategy::ALL.to_vec());
        assert_eq!(config.experiment.output_dir, PathBuf::from("results"));
        assert_eq!(config.experiment.max_concurrency, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryConfig::default().to_policy().unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_config_deserializes_partial_sections() {
        let toml = r#"
            [experiment]
            iterations = 5
            strategies = ["raw", "chain_of_thought"]

            [retry]
            retry_on = "all"
        "#;

        let config: BenchConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.experiment.iterations, 5);
        assert_eq!(
            config.experiment.strategies,
            vec![Strategy::Raw, Strategy::ChainOfThought]
        );
        assert_eq!(config.retry.retry_on, RetryOn::All);
        // Missing fields use defaults
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.experiment.output_dir, PathBuf::from("results"));
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let toml = r#"
            [experiment]
            strategies = ["raw", "yell"]
        "#;
        assert!(toml::from_str::<BenchConfig>(toml).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = BenchConfig::default();
        config.apply(Overrides {
            iterations: Some(2),
            strategies: vec![Strategy::RepeatBack],
            output_dir: Some(PathBuf::from("/tmp/out")),
            max_concurrency: Some(4),
            task_file: None,
        });

        assert_eq!(config.experiment.iterations, 2);
        assert_eq!(config.experiment.strategies, vec![Strategy::RepeatBack]);
        assert_eq!(config.experiment.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.experiment.max_concurrency, Some(4));
        assert_eq!(config.experiment.task_file, None);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = BenchConfig::default();
        config.apply(Overrides::default());
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BenchConfig::default();
        config.experiment.strategies.clear();
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));

        let mut config = BenchConfig::default();
        config.experiment.max_concurrency = Some(0);
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));

        let mut config = BenchConfig::default();
        config.retry.min_delay_secs = 20.0;
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));

        let mut config = BenchConfig::default();
        config.retry.max_delay_secs = -1.0;
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));

        let mut config = BenchConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));

        let mut config = BenchConfig::default();
        config.experiment.max_concurrency = Some(usize::MAX);
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));
    }

    #[test]
    fn test_validate_rejects_repeated_strategies() {
        let mut config = BenchConfig::default();
        config.apply(Overrides {
            iterations: Some(1),
            strategies: vec![Strategy::Raw, "raw".parse().unwrap()],
            ..Overrides::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'raw' more than once"));

        let config: BenchConfig =
            toml::from_str("[experiment]\nstrategies = [\"rb\", \"repeat_back\"]\n").unwrap();
        assert!(matches!(config.validate(), Err(BenchError::Fatal(_))));
    }

    #[test]
    fn test_env_var_expansion() {
        let mut config = BenchConfig::default();
        config.llm.api_key = Some("${RIDDLE_BENCH_TEST_API_KEY}".to_string());
        config.llm.api_base = "${RIDDLE_BENCH_TEST_API_BASE}".to_string();

        std::env::set_var("RIDDLE_BENCH_TEST_API_KEY", "test-key-123");
        std::env::set_var("RIDDLE_BENCH_TEST_API_BASE", "http://localhost:9999");
        config.resolve_env_vars();

        assert_eq!(config.llm.api_key, Some("test-key-123".to_string()));
        assert_eq!(config.llm.api_base, "http://localhost:9999");

        std::env::remove_var("RIDDLE_BENCH_TEST_API_KEY");
        std::env::remove_var("RIDDLE_BENCH_TEST_API_BASE");
    }

    #[test]
    fn test_remote_llm_config_explicit_key() {
        let mut config = BenchConfig::default();
        config.llm.api_key = Some("sk-explicit".to_string());
        config.llm.timeout_secs = 30;
        config.llm.max_tokens = 512;

        let remote = config.remote_llm_config().unwrap();

        assert_eq!(remote.api_key, "sk-explicit");
        assert_eq!(remote.base_url, "https://api.anthropic.com");
        assert_eq!(remote.timeout, Duration::from_secs(30));
        assert_eq!(remote.max_tokens, 512);
    }

    #[test]
    fn test_remote_llm_config_from_env() {
        let mut config = BenchConfig::default();
        config.llm.api_key_env = "RIDDLE_BENCH_TEST_ENV_KEY".to_string();

        std::env::set_var("RIDDLE_BENCH_TEST_ENV_KEY", "sk-from-env");
        let remote = config.remote_llm_config().unwrap();
        std::env::remove_var("RIDDLE_BENCH_TEST_ENV_KEY");

        assert_eq!(remote.api_key, "sk-from-env");
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let mut config = BenchConfig::default();
        config.llm.api_key = Some("${RIDDLE_BENCH_TEST_UNSET_VAR}".to_string());
        config.llm.api_key_env = "RIDDLE_BENCH_TEST_UNSET_VAR".to_string();
        config.resolve_env_vars();

        let err = config.remote_llm_config().unwrap_err();
        assert!(matches!(err, BenchError::Fatal(_)));
        assert!(err.to_string().contains("RIDDLE_BENCH_TEST_UNSET_VAR"));
    }
}
