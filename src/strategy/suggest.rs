//! Base-stake suggestion.
//!
//! Proposes a starting stake that keeps one full bust within a safe share
//! of capital while still reaching the profit goal in a reasonable number
//! of sessions. The result is advisory: [`check_suggestion`] re-validates
//! it against the currency minimum and the actual series cost.

use tracing::{debug, warn};

use super::series::series_cost;
use crate::types::Currency;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Never risk more than this share of capital on one bust.
const SAFE_CAPITAL_FRACTION: f64 = 0.7;
/// Wins needed to reach the goal at the efficient stake.
const EFFICIENT_WINS: f64 = 40.0;
/// Wins needed to reach the goal at the aggressive stake.
const FAST_WINS: f64 = 10.0;
/// The aggressive stake is only considered below this share of the safe base.
const FAST_COMFORT_FRACTION: f64 = 0.8;
/// Cap on the aggressive stake as a share of the safe base.
const FAST_CAP_FRACTION: f64 = 0.5;

fn usable(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Suggest a whole-unit base stake.
///
/// Never fails: non-positive or non-finite capital, goal or payout
/// collapses the result to 1.
pub fn suggest_base_amount(capital: f64, target_goal: f64, payout_rate: f64, max_steps: usize) -> u64 {
    if !(usable(capital) && usable(target_goal) && usable(payout_rate)) {
        return 1;
    }

    let cost_per_unit = series_cost(1.0, payout_rate, max_steps);
    let max_safe_base = capital * SAFE_CAPITAL_FRACTION / cost_per_unit;
    let efficient_base = target_goal / (EFFICIENT_WINS * payout_rate);
    let fast_base = target_goal / (FAST_WINS * payout_rate);

    let mut suggested = efficient_base.min(max_safe_base);
    if fast_base < FAST_COMFORT_FRACTION * max_safe_base {
        suggested = suggested.max(fast_base.min(FAST_CAP_FRACTION * max_safe_base));
    }

    let floored = suggested.floor();
    let result = if floored.is_finite() && floored >= 1.0 {
        floored as u64
    } else {
        1
    };

    debug!(
        capital,
        target_goal,
        payout_rate,
        max_steps,
        cost_per_unit,
        max_safe_base,
        efficient_base,
        fast_base,
        result,
        "Base amount suggested"
    );

    result
}

// ---------------------------------------------------------------------------
// Affordability check
// ---------------------------------------------------------------------------

/// A suggestion after it has been fitted to a currency and re-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Stake to use, never below the currency minimum.
    pub base_amount: f64,
    /// Raw heuristic output before the minimum was applied.
    pub heuristic_amount: u64,
    /// Whether the heuristic value had to be raised to the minimum.
    pub raised_to_minimum: bool,
    /// What a bust costs at `base_amount`.
    pub series_cost: f64,
    /// True when even this stake cannot fund a full series.
    pub exceeds_capital: bool,
}

/// Run the heuristic, raise it to the currency minimum, and re-check
/// that a full series is still affordable.
pub fn check_suggestion(
    capital: f64,
    target_goal: f64,
    payout_rate: f64,
    max_steps: usize,
    currency: Currency,
) -> Suggestion {
    let heuristic_amount = suggest_base_amount(capital, target_goal, payout_rate, max_steps);
    let min = currency.min_amount();
    let raised_to_minimum = (heuristic_amount as f64) < min;
    let base_amount = if raised_to_minimum {
        min
    } else {
        heuristic_amount as f64
    };

    let cost = series_cost(base_amount, payout_rate, max_steps);
    let exceeds_capital = cost > capital;

    if exceeds_capital {
        warn!(
            capital,
            series_cost = cost,
            max_steps,
            currency = %currency,
            "Capital cannot fund even the minimum series"
        );
    }

    Suggestion {
        base_amount,
        heuristic_amount,
        raised_to_minimum,
        series_cost: cost,
        exceeds_capital,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form_values_are_safe() {
        let base = suggest_base_amount(1000.0, 50.0, 0.92, 8);
        assert!(base >= 1);
        assert!(series_cost(base as f64, 0.92, 8) <= 0.7 * 1000.0);
        // Goal of 50 at 40 wins: ~1.36 → 1.
        assert_eq!(base, 1);
    }

    #[test]
    fn test_capped_by_capital() {
        // Huge goal, small capital: safety wins over efficiency.
        let base = suggest_base_amount(1000.0, 100_000.0, 0.92, 8);
        let cost_per_unit = series_cost(1.0, 0.92, 8);
        let max_safe = (700.0 / cost_per_unit).floor() as u64;
        assert_eq!(base, max_safe);
        assert!(series_cost(base as f64, 0.92, 8) <= 700.0);
    }

    #[test]
    fn test_fast_when_capital_is_ample() {
        // Goal 400 at 0.92 payout: efficient ~10.9, fast ~43.5.
        // Capital is large enough that the fast stake is comfortably safe.
        let base = suggest_base_amount(1_000_000.0, 400.0, 0.92, 8);
        assert_eq!(base, 43);
    }

    #[test]
    fn test_short_series_capped_by_capital() {
        // Three steps at 0.92 cost ~7.44 per unit, so 100 capital → safe base ~9.4.
        // efficient ~27 is clamped to 9.4; fast ~108 is not comfortably safe.
        let base = suggest_base_amount(100.0, 1000.0, 0.92, 3);
        let safe = 100.0 * 0.7 / series_cost(1.0, 0.92, 3);
        assert_eq!(base, safe.floor() as u64);
    }

    #[test]
    fn test_degrades_to_one() {
        assert_eq!(suggest_base_amount(0.0, 50.0, 0.92, 8), 1);
        assert_eq!(suggest_base_amount(-10.0, 50.0, 0.92, 8), 1);
        assert_eq!(suggest_base_amount(f64::NAN, 50.0, 0.92, 8), 1);
        assert_eq!(suggest_base_amount(1000.0, 0.0, 0.92, 8), 1);
        assert_eq!(suggest_base_amount(1000.0, 50.0, 0.0, 8), 1);
        assert_eq!(suggest_base_amount(1000.0, 50.0, f64::INFINITY, 8), 1);
    }

    #[test]
    fn test_tiny_capital_clamps_to_one() {
        assert_eq!(suggest_base_amount(5.0, 50.0, 0.92, 8), 1);
    }

    // -- check_suggestion --

    #[test]
    fn test_check_usd_affordable() {
        let s = check_suggestion(1000.0, 50.0, 0.92, 8, Currency::Usd);
        assert_eq!(s.base_amount, 1.0);
        assert!(!s.raised_to_minimum);
        assert!(!s.exceeds_capital);
        assert_eq!(s.series_cost, series_cost(1.0, 0.92, 8));
    }

    #[test]
    fn test_check_raises_to_pkr_minimum() {
        let s = check_suggestion(1000.0, 50.0, 0.92, 8, Currency::Pkr);
        assert_eq!(s.base_amount, 300.0);
        assert!(s.raised_to_minimum);
        // 300 Rs over 8 steps costs ~99k Rs.
        assert!(s.exceeds_capital);
    }

    #[test]
    fn test_check_pkr_with_enough_capital() {
        let s = check_suggestion(200_000.0, 50_000.0, 0.92, 8, Currency::Pkr);
        assert!(s.base_amount >= 300.0);
        assert!(!s.exceeds_capital);
    }
}
