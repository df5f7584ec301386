//! Session tracker — drives a [`SessionState`] through WIN/LOSS events
//! for one strategy configuration.
//!
//! The tracker owns the configuration, a memoized trade series, and the
//! session state. Goal completion is advisory: events are still applied
//! after the goal is met, and it is up to the caller to stop issuing them.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::session::{SessionState, Transition};
use crate::strategy::estimate::sessions_needed;
use crate::strategy::series::{SeriesCache, TradeSeries};
use crate::types::StrategyConfig;

/// Where each step of the running session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Lost,
    Current,
    Pending,
}

pub struct SessionTracker {
    config: StrategyConfig,
    cache: SeriesCache,
    series: TradeSeries,
    state: SessionState,
    started_at: DateTime<Utc>,
}

impl SessionTracker {
    pub fn new(config: StrategyConfig) -> Self {
        let mut cache = SeriesCache::new();
        let series = cache
            .get(config.base_amount, config.payout_rate, config.max_steps)
            .clone();

        info!(
            config = %config,
            total_investment = format!("{:.2}", series.total_investment),
            session_profit = format!("{:.2}", series.session_profit),
            "Session tracker started"
        );

        Self {
            config,
            cache,
            series,
            state: SessionState::new(),
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn series(&self) -> &TradeSeries {
        &self.series
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Swap in a new configuration. The series is only recomputed when
    /// the base amount, payout rate, or step count changed.
    ///
    /// Session state is kept. If the new series is shorter than the
    /// current step, the step is clamped to the last one.
    pub fn reconfigure(&mut self, config: StrategyConfig) {
        self.series = self
            .cache
            .get(config.base_amount, config.payout_rate, config.max_steps)
            .clone();
        self.config = config;

        let last = self.series.len().saturating_sub(1);
        if self.state.current_step > last {
            self.state.current_step = last;
        }
        info!(config = %self.config, "Session tracker reconfigured");
    }

    /// Series recomputations so far, including the initial one.
    pub fn series_recomputes(&self) -> u64 {
        self.cache.recomputes()
    }

    // -- Transitions ---------------------------------------------------------

    /// Record a win at the current step.
    pub fn on_win(&mut self) -> Transition {
        self.warn_if_goal_reached();
        let transition = self.state.apply_win(&self.series);
        if let Transition::Won { entry, step } = &transition {
            info!(
                session = entry.session,
                step = step + 1,
                profit = format!("{:.2}", entry.profit_delta),
                cumulative = format!("{:.2}", self.state.cumulative_profit),
                "Session won"
            );
        }
        self.log_goal_if_reached();
        transition
    }

    /// Record a loss at the current step.
    pub fn on_loss(&mut self) -> Transition {
        self.warn_if_goal_reached();
        let transition = self.state.apply_loss(&self.series);
        match &transition {
            Transition::Advanced { step } => {
                info!(
                    session = self.state.current_session,
                    step = step + 1,
                    next_stake = ?self.series.stake(*step),
                    "Loss, advancing to next step"
                );
            }
            Transition::Busted { entry } => {
                warn!(
                    session = entry.session,
                    loss = format!("{:.2}", -entry.profit_delta),
                    cumulative = format!("{:.2}", self.state.cumulative_profit),
                    "Session busted, every step lost"
                );
            }
            Transition::Won { .. } => {}
        }
        transition
    }

    /// Start over with a fresh session state; the configuration is kept.
    pub fn reset(&mut self) {
        self.state = SessionState::new();
        self.started_at = Utc::now();
        info!("Session state reset");
    }

    fn warn_if_goal_reached(&self) {
        if self.is_goal_reached() {
            warn!(
                cumulative = format!("{:.2}", self.state.cumulative_profit),
                goal = format!("{:.2}", self.config.target_goal),
                "Event recorded after the goal was already reached"
            );
        }
    }

    fn log_goal_if_reached(&self) {
        if self.is_goal_reached() {
            info!(
                cumulative = format!("{:.2}", self.state.cumulative_profit),
                goal = format!("{:.2}", self.config.target_goal),
                "Goal reached"
            );
        }
    }

    // -- Derived reads -------------------------------------------------------

    /// Cumulative profit as a percentage of the goal. May be negative or
    /// above 100.
    pub fn goal_progress_percent(&self) -> f64 {
        self.state.cumulative_profit / self.config.target_goal * 100.0
    }

    /// Fraction of resolved sessions that were wins.
    pub fn win_rate(&self) -> Option<f64> {
        self.state.win_rate()
    }

    /// Best-case winning sessions still needed to reach the goal.
    pub fn sessions_remaining(&self) -> u64 {
        sessions_needed(
            self.config.target_goal,
            self.state.cumulative_profit,
            self.series.session_profit,
        )
    }

    pub fn is_goal_reached(&self) -> bool {
        self.state.cumulative_profit >= self.config.target_goal
    }

    /// Stake to place at the current step.
    pub fn current_stake(&self) -> f64 {
        self.series
            .stake(self.state.current_step)
            .unwrap_or(self.config.base_amount)
    }

    /// Stakes already lost in the running session.
    pub fn loss_so_far(&self) -> f64 {
        self.series.loss_before(self.state.current_step)
    }

    /// Status of every step in the series relative to the current step.
    pub fn step_statuses(&self) -> Vec<StepStatus> {
        let current = self.state.current_step;
        (0..self.series.len())
            .map(|i| match i.cmp(&current) {
                std::cmp::Ordering::Less => StepStatus::Lost,
                std::cmp::Ordering::Equal => StepStatus::Current,
                std::cmp::Ordering::Greater => StepStatus::Pending,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
