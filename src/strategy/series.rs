//! Loss-recovery stake sequence.
//!
//! Derives the escalating stake for each step of a session so that a win
//! at any step recovers every stake lost earlier in the session and still
//! nets the same profit as a win on the first step.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Payout rate used when the caller doesn't supply one.
pub const DEFAULT_PAYOUT: f64 = 0.92;

/// Default number of steps in a session.
pub const DEFAULT_MAX_STEPS: usize = 8;

// ---------------------------------------------------------------------------
// Trade series
// ---------------------------------------------------------------------------

/// The full stake sequence for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSeries {
    /// Stake for each step, non-decreasing.
    pub trades: Vec<f64>,
    /// Sum of every stake: what a bust costs.
    pub total_investment: f64,
    /// Net profit of a win, `base_amount * payout_rate`.
    pub session_profit: f64,
    pub payout_rate: f64,
}

impl TradeSeries {
    /// Number of steps in the series.
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Stake for a step, if the step exists.
    pub fn stake(&self, step: usize) -> Option<f64> {
        self.trades.get(step).copied()
    }

    /// Sum of the stakes lost before reaching `step`.
    pub fn loss_before(&self, step: usize) -> f64 {
        self.trades.iter().take(step).sum()
    }

    /// Actual net profit of winning at `step`, after prior losses.
    ///
    /// Equals `session_profit` at step 0 and overshoots it by at most a
    /// few cents further in, because later stakes are rounded up.
    pub fn net_profit_at(&self, step: usize) -> Option<f64> {
        let stake = self.stake(step)?;
        Some(stake * self.payout_rate - self.loss_before(step))
    }
}

/// Round up to the next whole cent.
fn ceil_to_cents(amount: f64) -> f64 {
    (amount * 100.0).ceil() / 100.0
}

/// Compute the stake sequence for a configuration.
///
/// No validation is performed: a zero or negative payout rate yields
/// non-finite stakes, which the caller must guard against before display.
pub fn compute_series(base_amount: f64, payout_rate: f64, max_steps: usize) -> TradeSeries {
    let session_profit = base_amount * payout_rate;
    let mut trades = Vec::with_capacity(max_steps);
    let mut cumulative_loss = 0.0;

    for step in 0..max_steps {
        let stake = if step == 0 {
            base_amount
        } else {
            ceil_to_cents((cumulative_loss + session_profit) / payout_rate)
        };
        trades.push(stake);
        cumulative_loss += stake;
    }

    let total_investment = trades.iter().sum();

    TradeSeries {
        trades,
        total_investment,
        session_profit,
        payout_rate,
    }
}

/// Capital needed to fund a whole series; a bust costs exactly this.
pub fn series_cost(base_amount: f64, payout_rate: f64, max_steps: usize) -> f64 {
    compute_series(base_amount, payout_rate, max_steps).total_investment
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Floats are keyed by bit pattern so that a cached NaN series still hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeriesKey {
    base_amount: u64,
    payout_rate: u64,
    max_steps: usize,
}

impl SeriesKey {
    fn new(base_amount: f64, payout_rate: f64, max_steps: usize) -> Self {
        Self {
            base_amount: base_amount.to_bits(),
            payout_rate: payout_rate.to_bits(),
            max_steps,
        }
    }
}

/// Holds the most recently computed series and reuses it until one of
/// `(base_amount, payout_rate, max_steps)` changes.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entry: Option<(SeriesKey, TradeSeries)>,
    recomputes: u64,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the series for these inputs, recomputing only on a key change.
    pub fn get(&mut self, base_amount: f64, payout_rate: f64, max_steps: usize) -> &TradeSeries {
        let key = SeriesKey::new(base_amount, payout_rate, max_steps);

        let entry = match self.entry.take() {
            Some((cached, series)) if cached == key => (cached, series),
            _ => {
                let series = compute_series(base_amount, payout_rate, max_steps);
                self.recomputes += 1;
                debug!(
                    base_amount,
                    payout_rate,
                    max_steps,
                    total_investment = series.total_investment,
                    "Trade series recomputed"
                );
                (key, series)
            }
        };

        &self.entry.insert(entry).1
    }

    /// How many times the series has actually been computed.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
