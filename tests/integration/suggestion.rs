//! Suggestion heuristic checked against the series it sizes.

use recoverypro::strategy::series::{compute_series, series_cost};
use recoverypro::strategy::suggest::{check_suggestion, suggest_base_amount};
use recoverypro::types::{Currency, StrategyConfig};

#[test]
fn test_suggestion_respects_safety_bound() {
    let base = suggest_base_amount(1000.0, 50.0, 0.92, 8);
    assert!(base >= 1);
    assert!(series_cost(base as f64, 0.92, 8) <= 0.7 * 1000.0);
}

#[test]
fn test_suggestion_safe_across_capitals() {
    for capital in [500.0, 1_000.0, 5_000.0, 25_000.0, 100_000.0] {
        for steps in [3, 5, 8] {
            let base = suggest_base_amount(capital, 10_000.0, 0.92, steps);
            let cost = series_cost(base as f64, 0.92, steps);
            // Per-step cent rounding can push cost a few cents past the
            // linear estimate; allow for it.
            if base > 1 {
                assert!(
                    cost <= capital * 0.7 + 0.01 * steps as f64,
                    "capital {capital} steps {steps}: base {base} costs {cost}"
                );
            }
        }
    }
}

#[test]
fn test_suggestion_builds_a_valid_config() {
    let s = check_suggestion(1000.0, 50.0, 0.92, 8, Currency::Usd);
    let cfg = StrategyConfig::new(s.base_amount, 0.92, 8, 50.0, 1000.0, Currency::Usd).unwrap();
    assert!(!cfg.is_risky());
    assert_eq!(cfg.series_cost(), s.series_cost);
}

#[test]
fn test_series_cost_consistent_with_series() {
    for (base, steps) in [(1.0, 8), (10.0, 3), (300.0, 6), (42.5, 1)] {
        assert_eq!(
            series_cost(base, 0.92, steps),
            compute_series(base, 0.92, steps).total_investment
        );
    }
}
