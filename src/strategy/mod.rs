//! Strategy engine — stake sequence, base-stake suggestion, and goal
//! estimates.

pub mod estimate;
pub mod series;
pub mod suggest;

use tracing::{info, warn};

use crate::types::StrategyConfig;
use estimate::sessions_needed;
use series::{compute_series, TradeSeries};

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Everything a caller needs to show before a session run starts.
#[derive(Debug, Clone)]
pub struct StrategyPlan {
    pub series: TradeSeries,
    /// Winning sessions needed from zero profit.
    pub sessions_to_goal: u64,
    /// A full bust costs more than the available capital.
    pub exceeds_capital: bool,
    /// Share of capital one bust consumes, in percent.
    pub drawdown_pct: f64,
}

/// Derive the stake sequence and goal estimate for a configuration.
pub fn plan(config: &StrategyConfig) -> StrategyPlan {
    let series = compute_series(config.base_amount, config.payout_rate, config.max_steps);
    let sessions_to_goal = sessions_needed(config.target_goal, 0.0, series.session_profit);
    let exceeds_capital = series.total_investment > config.capital;
    let drawdown_pct = series.total_investment / config.capital * 100.0;

    if exceeds_capital {
        warn!(
            max_steps = config.max_steps,
            required = format!("{:.2}", series.total_investment),
            capital = format!("{:.2}", config.capital),
            "Consecutive losses across every step would exceed capital"
        );
    }

    info!(
        base_amount = config.base_amount,
        steps = series.len(),
        total_investment = format!("{:.2}", series.total_investment),
        session_profit = format!("{:.2}", series.session_profit),
        sessions_to_goal,
        "Strategy planned"
    );

    StrategyPlan {
        series,
        sessions_to_goal,
        exceeds_capital,
        drawdown_pct,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
