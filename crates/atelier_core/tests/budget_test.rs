use atelier_core::{ConcurrencyMode, CoordinatorSettings, RateBudget};
use std::time::Duration;

#[test]
fn default_budget_matches_sonnet_limits() {
    let budget = RateBudget::default();
    assert_eq!(*budget.max_requests_per_window(), 1000);
    assert_eq!(*budget.max_tokens_per_window(), 450_000);
    assert_eq!(*budget.window(), Duration::from_secs(60));
    assert_eq!(*budget.min_interval(), Duration::from_millis(100));
    assert_eq!(*budget.max_concurrent(), 1);
}

#[test]
fn builder_fills_unset_fields_from_default() {
    let budget = RateBudget::builder()
        .max_requests_per_window(50)
        .max_concurrent(3)
        .build()
        .unwrap();

    assert_eq!(*budget.max_requests_per_window(), 50);
    assert_eq!(*budget.max_concurrent(), 3);
    assert_eq!(*budget.max_tokens_per_window(), 450_000); // Default
}

#[test]
fn build_rejects_zero_ceilings() {
    assert!(RateBudget::builder().max_requests_per_window(0).build().is_err());
    assert!(RateBudget::builder().max_tokens_per_window(0).build().is_err());
    assert!(RateBudget::builder().max_concurrent(0).build().is_err());
    assert!(RateBudget::builder().window(Duration::ZERO).build().is_err());
}

#[test]
fn build_rejects_interval_longer_than_window() {
    let err = RateBudget::builder()
        .window(Duration::from_secs(1))
        .min_interval(Duration::from_secs(2))
        .build()
        .unwrap_err();
    assert!(err.message.contains("min_interval"));
}

#[test]
fn zero_min_interval_is_allowed() {
    let budget = RateBudget::builder()
        .min_interval(Duration::ZERO)
        .build()
        .unwrap();
    assert!(budget.min_interval().is_zero());
}

#[test]
fn estimate_equal_to_budget_is_admissible() {
    let budget = RateBudget::builder()
        .max_tokens_per_window(7_500)
        .build()
        .unwrap();
    assert!(budget.admits_estimate(7_500));
    assert!(!budget.admits_estimate(7_501));
}

#[test]
fn coordinator_settings_reject_zero_concurrency() {
    assert!(CoordinatorSettings::new(0, Duration::from_secs(1)).is_err());
    let settings = CoordinatorSettings::new(4, Duration::ZERO).unwrap();
    assert_eq!(*settings.concurrency(), 4);
}

#[test]
fn concurrency_mode_defaults_to_sequential() {
    assert_eq!(ConcurrencyMode::default(), ConcurrencyMode::Sequential);
    assert_eq!(ConcurrencyMode::Concurrent.to_string(), "concurrent");
}
