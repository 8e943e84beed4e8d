//! Engine configuration.
//!
//! [`MockConfig`] controls what happens to reported failures when no custom
//! [`Reporter`](crate::Reporter) is supplied and how much call history is
//! rendered into failure messages.
//!
//! Values are layered by [`ConfigLoader`]:
//! 1. Defaults (lowest)
//! 2. Environment variables (`DECOY_*`)
//! 3. Programmatic overrides (highest)
//!
//! | Key | Values | Default |
//! |-----|--------|---------|
//! | `DECOY_FAILURE_MODE` | `panic`, `log` | `panic` |
//! | `DECOY_HISTORY_LIMIT` | `0..=1024` | `8` |

use std::collections::BTreeMap;

use crate::report::Reporter;

const FAILURE_MODE_KEY: &str = "DECOY_FAILURE_MODE";
const HISTORY_LIMIT_KEY: &str = "DECOY_HISTORY_LIMIT";
const ENV_KEYS: [&str; 2] = [FAILURE_MODE_KEY, HISTORY_LIMIT_KEY];

/// Largest accepted `history_limit`.
pub const MAX_HISTORY_LIMIT: usize = 1024;

/// What the default reporter does with a failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Panic, failing the current test.
    #[default]
    Panic,
    /// Log at `warn` and continue.
    Log,
}

impl FailureMode {
    /// The reporter implementing this mode.
    #[must_use]
    pub fn reporter(self) -> Reporter {
        match self {
            Self::Panic => Reporter::panicking(),
            Self::Log => Reporter::logging(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Default reporter behavior.
    pub failure_mode: FailureMode,
    /// Number of most recent calls of the double rendered into failure
    /// messages. `0` omits the history section.
    pub history_limit: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::Panic,
            history_limit: 8,
        }
    }
}

impl MockConfig {
    /// Validates configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::HistoryLimitTooLarge(self.history_limit));
        }
        Ok(())
    }

    /// Sets the failure mode.
    #[must_use]
    pub fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Sets the history limit.
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

/// Configuration loader with layered sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    base: MockConfig,
    overrides: BTreeMap<String, String>,
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base configuration.
    #[must_use]
    pub fn base(mut self, config: MockConfig) -> Self {
        self.base = config;
        self
    }

    /// Adds a programmatic override (highest precedence). Keys use the
    /// environment variable names.
    #[must_use]
    pub fn override_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Loads configuration from the base, the process environment and the
    /// overrides, then validates it.
    pub fn load(&self) -> Result<MockConfig, ConfigError> {
        self.load_with_env(std::env::vars())
    }

    /// Like [`load`](Self::load) but reads "environment" pairs from `vars`.
    ///
    /// Only the recognized keys are read from `vars`; other `DECOY_*`
    /// variables (the test suite's own, for instance) are left alone.
    /// Unknown keys passed to [`override_value`](Self::override_value) are
    /// rejected.
    pub fn load_with_env<I>(&self, vars: I) -> Result<MockConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = self.base.clone();
        let env: BTreeMap<String, String> = vars
            .into_iter()
            .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
            .collect();
        apply_overrides(&mut config, &env)?;
        apply_overrides(&mut config, &self.overrides)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Unknown override key.
    #[error("invalid override: {0}")]
    InvalidOverride(String),
    /// Unparseable value.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Failure mode is neither `panic` nor `log`.
    #[error("invalid failure mode: {0}")]
    InvalidFailureMode(String),
    /// History limit above [`MAX_HISTORY_LIMIT`].
    #[error("history_limit {0} exceeds {MAX_HISTORY_LIMIT}")]
    HistoryLimitTooLarge(usize),
}

fn apply_overrides(
    config: &mut MockConfig,
    overrides: &BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for (key, value) in overrides {
        apply_override(config, key, value)?;
    }
    Ok(())
}

fn apply_override(config: &mut MockConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        FAILURE_MODE_KEY => config.failure_mode = parse_failure_mode(value)?,
        HISTORY_LIMIT_KEY => config.history_limit = parse_usize(value, key)?,
        _ => return Err(ConfigError::InvalidOverride(key.to_string())),
    }
    Ok(())
}

fn parse_failure_mode(value: &str) -> Result<FailureMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "panic" => Ok(FailureMode::Panic),
        "log" => Ok(FailureMode::Log),
        _ => Err(ConfigError::InvalidFailureMode(value.to_string())),
    }
}

fn parse_usize(value: &str, key: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::Parse(format!("invalid usize for {key}: {value}")))
}
