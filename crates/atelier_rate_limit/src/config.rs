//! TOML configuration for budgets, retries and the coordinator.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from atelier.toml)
//! - User overrides (~/.config/atelier/atelier.toml, then ./atelier.toml)
//! - Automatic merging with user values taking precedence
//!
//! Raw values are deserialized into the structs below and converted to the
//! validated core types on demand, so a bad value is reported as a
//! [`ConfigError`] naming the offending option.

use crate::BudgetPreset;
use atelier_core::{ConcurrencyMode, CoordinatorSettings, RateBudget, RetryPolicy, RetrySchedule};
use atelier_error::{AtelierError, AtelierResult, ConfigError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Rate budget for one provider.
///
/// Every field is optional. Unset fields come from `preset` if one is named,
/// otherwise from [`RateBudget::default`].
///
/// # Example
///
/// ```toml
/// [providers.gemini]
/// preset = "gemini-free"
/// max_concurrent = 2   # Overrides the preset
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ProviderConfig {
    /// Named preset to start from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<BudgetPreset>,

    /// Grants allowed per window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests_per_window: Option<u32>,

    /// Token estimates allowed per window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens_per_window: Option<u64>,

    /// Window length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_secs: Option<u64>,

    /// Minimum spacing between grants in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_interval_ms: Option<u64>,

    /// Admissions allowed in flight at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

impl ProviderConfig {
    /// Build the validated budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting budget fails validation.
    pub fn to_budget(&self) -> Result<RateBudget, ConfigError> {
        let mut builder = self
            .preset
            .map(BudgetPreset::builder)
            .unwrap_or_default();

        if let Some(value) = self.max_requests_per_window {
            builder = builder.max_requests_per_window(value);
        }
        if let Some(value) = self.max_tokens_per_window {
            builder = builder.max_tokens_per_window(value);
        }
        if let Some(secs) = self.window_secs {
            builder = builder.window(Duration::from_secs(secs));
        }
        if let Some(ms) = self.min_interval_ms {
            builder = builder.min_interval(Duration::from_millis(ms));
        }
        if let Some(value) = self.max_concurrent {
            builder = builder.max_concurrent(value);
        }

        builder.build()
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_schedule_secs() -> Vec<u64> {
    vec![5, 15, 45]
}

fn default_call_timeout_secs() -> u64 {
    120
}

/// Retry settings for backend calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total calls per attempt, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff delays in seconds, indexed by retry count
    #[serde(default = "default_schedule_secs")]
    pub schedule_secs: Vec<u64>,

    /// Per-call timeout in seconds; 0 disables the timeout
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            schedule_secs: default_schedule_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl RetryConfig {
    /// Build the validated retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule is empty or `max_retries` is zero.
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let schedule = RetrySchedule::new(
            self.schedule_secs
                .iter()
                .map(|secs| Duration::from_secs(*secs))
                .collect(),
        )?;
        let call_timeout =
            (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs));
        Ok(RetryPolicy::new(self.max_retries, schedule)?.with_call_timeout(call_timeout))
    }
}

fn default_concurrency() -> usize {
    2
}

fn default_inter_attempt_delay_ms() -> u64 {
    2000
}

/// Coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CoordinatorConfig {
    /// Scheduling mode
    #[serde(default)]
    pub mode: ConcurrencyMode,

    /// Attempts in flight at once in concurrent mode
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause between sequential attempts in milliseconds
    #[serde(default = "default_inter_attempt_delay_ms")]
    pub inter_attempt_delay_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            mode: ConcurrencyMode::default(),
            concurrency: default_concurrency(),
            inter_attempt_delay_ms: default_inter_attempt_delay_ms(),
        }
    }
}

impl CoordinatorConfig {
    /// Build the validated coordinator settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `concurrency` is zero.
    pub fn to_settings(&self) -> Result<CoordinatorSettings, ConfigError> {
        CoordinatorSettings::new(
            self.concurrency,
            Duration::from_millis(self.inter_attempt_delay_ms),
        )
    }
}

/// Top-level Atelier configuration.
///
/// Loads configuration from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from atelier.toml)
/// 2. User config in home directory (~/.config/atelier/atelier.toml)
/// 3. User config in current directory (./atelier.toml)
///
/// # Example
///
/// ```no_run
/// use atelier_rate_limit::AtelierConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AtelierConfig::load()?;
/// let budget = config.budget_for(None)?;
/// println!("Default provider RPM: {}", budget.max_requests_per_window());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct AtelierConfig {
    /// Provider used when none is named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Map of provider name to budget
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Coordinator settings
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

impl AtelierConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> AtelierResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument]
    pub fn load() -> AtelierResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../atelier.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/atelier/atelier.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("atelier").required(false));

        builder
            .build()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Get the budget section for a provider, falling back to
    /// `default_provider` when `provider` is `None`.
    pub fn provider(&self, provider: Option<&str>) -> Option<&ProviderConfig> {
        let name = provider.or(self.default_provider.as_deref())?;
        self.providers.get(name)
    }

    /// Validated budget for a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or its budget is invalid.
    pub fn budget_for(&self, provider: Option<&str>) -> Result<RateBudget, ConfigError> {
        self.provider(provider)
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "No configuration for provider '{}'",
                    provider
                        .or(self.default_provider.as_deref())
                        .unwrap_or("<none>")
                ))
            })?
            .to_budget()
    }
}
