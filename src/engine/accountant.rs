//! Accountant — end-of-run summary of a session tracker.
//!
//! Folds the tracker's state into a single report: sessions resolved,
//! wins and busts, net profit, goal progress, and run time.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::info;

use super::tracker::SessionTracker;

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Summary of a run of sessions.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sessions_resolved: usize,
    pub wins: usize,
    pub busts: usize,
    /// Fraction of resolved sessions that were wins.
    pub win_rate: Option<f64>,
    pub cumulative_profit: f64,
    /// Largest single-session loss seen (a bust), zero if none.
    pub worst_session: f64,
    pub goal_progress_pct: f64,
    pub goal_reached: bool,
    pub sessions_remaining: u64,
    /// Step the unfinished session is on, if any step has been lost in it.
    pub open_step: Option<usize>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = match self.win_rate {
            Some(r) => format!("{:.0}%", r * 100.0),
            None => "-".to_string(),
        };
        write!(
            f,
            "sessions={} (W{}/B{}) | win_rate={} | profit={:.2} | goal={:.0}%{}",
            self.sessions_resolved,
            self.wins,
            self.busts,
            rate,
            self.cumulative_profit,
            self.goal_progress_pct,
            if self.goal_reached { " ✓" } else { "" },
        )
    }
}

// ---------------------------------------------------------------------------
// Accountant
// ---------------------------------------------------------------------------

pub struct Accountant;

impl Accountant {
    /// Summarise the tracker's run so far.
    pub fn summarize(tracker: &SessionTracker) -> RunSummary {
        let state = tracker.state();
        let worst_session = state
            .history()
            .iter()
            .map(|e| e.profit_delta)
            .fold(0.0_f64, f64::min);

        let summary = RunSummary {
            sessions_resolved: state.history().len(),
            wins: state.wins(),
            busts: state.busts(),
            win_rate: state.win_rate(),
            cumulative_profit: state.cumulative_profit,
            worst_session,
            goal_progress_pct: tracker.goal_progress_percent(),
            goal_reached: tracker.is_goal_reached(),
            sessions_remaining: tracker.sessions_remaining(),
            open_step: (state.current_step > 0).then_some(state.current_step),
            started_at: tracker.started_at(),
            finished_at: Utc::now(),
        };

        info!(
            sessions = summary.sessions_resolved,
            wins = summary.wins,
            busts = summary.busts,
            profit = format!("{:.2}", summary.cumulative_profit),
            goal_pct = format!("{:.1}", summary.goal_progress_pct),
            "Run summarized"
        );

        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
