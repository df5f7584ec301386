//! Session state machine.
//!
//! Holds the running session number, the step within the current session,
//! cumulative profit, and the resolved-session history. Transitions are
//! applied against a fixed [`TradeSeries`] that the state references but
//! does not own.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::strategy::series::TradeSeries;
use crate::types::{HistoryEntry, SessionResult};

// ---------------------------------------------------------------------------
// Transition outcome
// ---------------------------------------------------------------------------

/// What a single WIN or LOSS event did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Loss before the final step: the session continues at `step`.
    Advanced { step: usize },
    /// Win at any step: the session closed with a profit.
    Won { entry: HistoryEntry, step: usize },
    /// Loss at the final step: every stake in the series was lost.
    Busted { entry: HistoryEntry },
}

impl Transition {
    /// Whether this transition closed a session.
    pub fn closes_session(&self) -> bool {
        !matches!(self, Transition::Advanced { .. })
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Mutable progress through a run of sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// 1-based; incremented every time a session resolves.
    pub current_session: u64,
    /// 0-based index into the series; reset at the start of each session.
    pub current_step: usize,
    pub cumulative_profit: f64,
    /// Resolved sessions, newest first. Only `close_session` appends.
    history: VecDeque<HistoryEntry>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session={} step={} profit={:.2} resolved={}",
            self.current_session,
            self.current_step + 1,
            self.cumulative_profit,
            self.history.len(),
        )
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_session: 1,
            current_step: 0,
            cumulative_profit: 0.0,
            history: VecDeque::new(),
        }
    }

    /// Resolved sessions, newest first.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    /// Apply a win. Closes the session whatever step it happened on.
    pub fn apply_win(&mut self, series: &TradeSeries) -> Transition {
        let step = self.current_step;
        let entry = self.close_session(SessionResult::Win, series.session_profit);
        Transition::Won { entry, step }
    }

    /// Apply a loss: advance a step, or bust on the final step.
    pub fn apply_loss(&mut self, series: &TradeSeries) -> Transition {
        if self.current_step + 1 < series.len() {
            self.current_step += 1;
            return Transition::Advanced {
                step: self.current_step,
            };
        }
        let entry = self.close_session(SessionResult::Bust, -series.total_investment);
        Transition::Busted { entry }
    }

    fn close_session(&mut self, result: SessionResult, profit_delta: f64) -> HistoryEntry {
        self.cumulative_profit += profit_delta;
        let entry = HistoryEntry {
            session: self.current_session,
            result,
            profit_delta,
            timestamp: Utc::now(),
        };
        self.history.push_front(entry.clone());
        self.current_session += 1;
        self.current_step = 0;
        entry
    }

    /// Number of sessions that ended in a win.
    pub fn wins(&self) -> usize {
        self.history
            .iter()
            .filter(|e| e.result == SessionResult::Win)
            .count()
    }

    /// Number of sessions that ended in a bust.
    pub fn busts(&self) -> usize {
        self.history.len() - self.wins()
    }

    /// Fraction of resolved sessions that were wins, `None` before any
    /// session has resolved.
    pub fn win_rate(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.wins() as f64 / self.history.len() as f64)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
