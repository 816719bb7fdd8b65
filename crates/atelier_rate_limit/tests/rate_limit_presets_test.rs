//! Tests for provider budget presets.

use atelier_rate_limit::BudgetPreset;
use std::str::FromStr;
use std::time::Duration;
use strum::IntoEnumIterator;

#[test]
fn test_every_preset_builds() {
    for preset in BudgetPreset::iter() {
        let budget = preset.budget().unwrap();
        assert_eq!(*budget.window(), Duration::from_secs(60), "{}", preset);
    }
}

#[test]
fn test_preset_names_round_trip() {
    for preset in BudgetPreset::iter() {
        assert_eq!(BudgetPreset::from_str(&preset.to_string()).unwrap(), preset);
    }
    assert_eq!(BudgetPreset::AnthropicTier1.to_string(), "anthropic-tier1");
    assert!(BudgetPreset::from_str("anthropic-tier9").is_err());
}

#[test]
fn test_sonnet_preset_matches_default_budget() {
    let budget = BudgetPreset::AnthropicSonnet.budget().unwrap();
    assert_eq!(budget, atelier_core::RateBudget::default());
}

#[test]
fn test_tier_limits() {
    let anthropic = BudgetPreset::AnthropicTier1.budget().unwrap();
    assert_eq!(*anthropic.max_requests_per_window(), 50);
    assert_eq!(*anthropic.max_tokens_per_window(), 40_000);
    assert_eq!(*anthropic.max_concurrent(), 5);

    let openai = BudgetPreset::OpenaiTier1.budget().unwrap();
    assert_eq!(*openai.max_requests_per_window(), 500);
    assert_eq!(*openai.max_concurrent(), 50);

    let gemini = BudgetPreset::GeminiFree.budget().unwrap();
    assert_eq!(*gemini.max_tokens_per_window(), 250_000);
    assert_eq!(*gemini.max_concurrent(), 1);
}
