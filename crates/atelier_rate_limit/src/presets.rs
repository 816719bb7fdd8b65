//! Known provider budgets.
//!
//! Limits follow each provider's published rate-limit tables. They are a
//! starting point; configuration can override any field.

use atelier_core::{RateBudget, RateBudgetBuilder};
use atelier_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Named provider budget.
///
/// # Example
///
/// ```
/// use atelier_rate_limit::BudgetPreset;
/// use std::str::FromStr;
///
/// let preset = BudgetPreset::from_str("gemini-free").unwrap();
/// let budget = preset.budget().unwrap();
/// assert_eq!(*budget.max_requests_per_window(), 10);
/// assert_eq!(preset.to_string(), "gemini-free");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BudgetPreset {
    /// Claude Sonnet: 1000 RPM, 450K TPM, 100ms spacing, 1 concurrent
    AnthropicSonnet,
    /// Anthropic tier 1: 50 RPM, 40K TPM, 5 concurrent
    #[strum(serialize = "anthropic-tier1")]
    #[serde(rename = "anthropic-tier1")]
    AnthropicTier1,
    /// OpenAI tier 1: 500 RPM, 200K TPM, 50 concurrent
    #[strum(serialize = "openai-tier1")]
    #[serde(rename = "openai-tier1")]
    OpenaiTier1,
    /// Gemini free tier: 10 RPM, 250K TPM, 1 concurrent
    GeminiFree,
}

impl BudgetPreset {
    /// A builder pre-filled with this preset's limits.
    pub fn builder(self) -> RateBudgetBuilder {
        let builder = RateBudget::builder().window(Duration::from_secs(60));
        match self {
            BudgetPreset::AnthropicSonnet => builder
                .max_requests_per_window(1000)
                .max_tokens_per_window(450_000)
                .min_interval(Duration::from_millis(100))
                .max_concurrent(1),
            BudgetPreset::AnthropicTier1 => builder
                .max_requests_per_window(50)
                .max_tokens_per_window(40_000)
                .min_interval(Duration::ZERO)
                .max_concurrent(5),
            BudgetPreset::OpenaiTier1 => builder
                .max_requests_per_window(500)
                .max_tokens_per_window(200_000)
                .min_interval(Duration::ZERO)
                .max_concurrent(50),
            BudgetPreset::GeminiFree => builder
                .max_requests_per_window(10)
                .max_tokens_per_window(250_000)
                .min_interval(Duration::ZERO)
                .max_concurrent(1),
        }
    }

    /// The validated budget for this preset.
    ///
    /// # Errors
    ///
    /// Propagates budget validation; every preset passes it.
    pub fn budget(self) -> Result<RateBudget, ConfigError> {
        self.builder().build()
    }
}
