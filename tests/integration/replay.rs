//! Session replay harness.
//!
//! Feeds scripted win/loss sequences through a `SessionTracker` and checks
//! the resulting state against hand-computed profit and session counts.

use recoverypro::engine::accountant::Accountant;
use recoverypro::engine::session::Transition;
use recoverypro::engine::tracker::SessionTracker;
use recoverypro::strategy::series::compute_series;
use recoverypro::types::{Currency, SessionResult, StrategyConfig};

const EPS: f64 = 1e-9;

fn make_tracker(base: f64, steps: usize, goal: f64) -> SessionTracker {
    SessionTracker::new(StrategyConfig::new(base, 0.92, steps, goal, 10_000.0, Currency::Usd).unwrap())
}

/// Replay a script of 'W'/'L' characters, returning every transition.
fn replay(tracker: &mut SessionTracker, script: &str) -> Vec<Transition> {
    script
        .chars()
        .map(|c| match c {
            'W' => tracker.on_win(),
            'L' => tracker.on_loss(),
            other => panic!("bad script char {other}"),
        })
        .collect()
}

#[test]
fn test_win_at_first_step_scenario() {
    let mut t = make_tracker(10.0, 3, 50.0);
    replay(&mut t, "W");
    assert!((t.state().cumulative_profit - 9.2).abs() < EPS);
    assert_eq!(t.state().current_session, 2);
    assert_eq!(t.state().current_step, 0);
}

#[test]
fn test_three_losses_bust_once() {
    let mut t = make_tracker(10.0, 3, 50.0);
    let transitions = replay(&mut t, "LLL");

    let closed: Vec<_> = transitions.iter().filter(|t| t.closes_session()).collect();
    assert_eq!(closed.len(), 1);
    assert!(matches!(transitions[2], Transition::Busted { .. }));

    let total = compute_series(10.0, 0.92, 3).total_investment;
    assert_eq!(t.state().cumulative_profit, -total);
    assert!((t.state().cumulative_profit + 74.43).abs() < EPS);
    assert_eq!(t.state().current_session, 2);
}

#[test]
fn test_win_profit_is_same_at_every_step() {
    // A win closes the session with the same credited profit whatever the step.
    for losses in 0..8 {
        let mut t = make_tracker(5.0, 8, 1000.0);
        let script = format!("{}W", "L".repeat(losses));
        replay(&mut t, &script);
        assert!((t.state().cumulative_profit - 5.0 * 0.92).abs() < EPS, "after {losses} losses");
        assert_eq!(t.state().current_session, 2);
        assert_eq!(t.state().current_step, 0);
    }
}

#[test]
fn test_long_mixed_run() {
    let mut t = make_tracker(10.0, 3, 1000.0);
    // Sessions: W, LW, LLL (bust), LLW, W
    replay(&mut t, "WLWLLLLLWW");

    let s = t.state();
    assert_eq!(s.current_session, 6);
    assert_eq!(s.history().len(), 5);
    let results: Vec<SessionResult> = s.history().iter().rev().map(|e| e.result).collect();
    assert_eq!(
        results,
        vec![
            SessionResult::Win,
            SessionResult::Win,
            SessionResult::Bust,
            SessionResult::Win,
            SessionResult::Win,
        ]
    );
    let expected = 4.0 * 9.2 - 74.43;
    assert!((s.cumulative_profit - expected).abs() < 1e-6);

    let summary = Accountant::summarize(&t);
    assert_eq!(summary.wins, 4);
    assert_eq!(summary.busts, 1);
    assert_eq!(summary.win_rate, Some(0.8));
}

#[test]
fn test_history_entries_are_never_rewritten() {
    let mut t = make_tracker(10.0, 2, 1000.0);
    replay(&mut t, "W");
    let first = t.state().history()[0].clone();
    replay(&mut t, "LLWLW");
    let oldest = t.state().history().back().unwrap();
    assert_eq!(oldest, &first);
}

#[test]
fn test_run_to_goal() {
    let mut t = make_tracker(10.0, 3, 50.0);
    let mut events = 0;
    while !t.is_goal_reached() {
        t.on_win();
        events += 1;
        assert!(events < 100, "goal never reached");
    }
    assert_eq!(events, 6);
    assert_eq!(t.sessions_remaining(), 0);
    assert!(t.goal_progress_percent() >= 100.0);
}

#[test]
fn test_bust_then_recover_to_goal_estimate() {
    let mut t = make_tracker(10.0, 3, 50.0);
    replay(&mut t, "LLL");
    // (50 + 74.43) / 9.2 = 13.5 → 14 wins needed.
    assert_eq!(t.sessions_remaining(), 14);
}
