//! Sessions-needed estimate.

/// Winning sessions still needed to reach `target_goal` from
/// `current_balance`.
///
/// Best case: assumes every remaining session ends in a win and ignores
/// the chance of a bust.
pub fn sessions_needed(target_goal: f64, current_balance: f64, session_profit: f64) -> u64 {
    let remaining = target_goal - current_balance;
    if remaining <= 0.0 {
        return 0;
    }
    (remaining / session_profit).ceil() as u64
}
