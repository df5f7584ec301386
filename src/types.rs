//! Shared types for RecoveryPro.
//!
//! These types form the data model used across the strategy and engine
//! modules: currencies, the immutable strategy configuration, session
//! history records, and the domain error enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::strategy::series::series_cost;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Supported stake currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Pkr,
}

impl Currency {
    /// All known currencies (useful for iteration).
    pub const ALL: &'static [Currency] = &[Currency::Usd, Currency::Pkr];

    /// ISO-style currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Pkr => "PKR",
        }
    }

    /// Display symbol placed in front of amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Pkr => "Rs",
        }
    }

    /// Smallest stake the broker accepts in this currency.
    pub fn min_amount(&self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Pkr => 300.0,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Parse a currency code (case-insensitive).
impl std::str::FromStr for Currency {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "PKR" => Ok(Currency::Pkr),
            _ => Err(RecoveryError::UnknownCurrency(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy configuration
// ---------------------------------------------------------------------------

/// Immutable parameters for one session run.
///
/// Built by the caller from user input. Use [`StrategyConfig::new`] to get
/// the minimum-stake and positivity checks; the struct fields stay public so
/// tests and callers that already validated can build it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Stake for step 0 of every session.
    pub base_amount: f64,
    /// Fractional profit on a winning stake (0.92 = 92%).
    pub payout_rate: f64,
    /// Consecutive losses the sequence survives before a bust.
    pub max_steps: usize,
    /// Desired cumulative net profit.
    pub target_goal: f64,
    /// Funds available to sustain one full loss sequence.
    pub capital: f64,
    pub currency: Currency,
}

impl StrategyConfig {
    /// Build a validated configuration.
    pub fn new(
        base_amount: f64,
        payout_rate: f64,
        max_steps: usize,
        target_goal: f64,
        capital: f64,
        currency: Currency,
    ) -> Result<Self, RecoveryError> {
        let config = Self {
            base_amount,
            payout_rate,
            max_steps,
            target_goal,
            capital,
            currency,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants a caller must uphold before starting a session.
    pub fn validate(&self) -> Result<(), RecoveryError> {
        if !(self.payout_rate.is_finite() && self.payout_rate > 0.0) {
            return Err(RecoveryError::InvalidConfig(format!(
                "payout rate must be positive, got {}",
                self.payout_rate
            )));
        }
        if self.max_steps == 0 {
            return Err(RecoveryError::InvalidConfig(
                "max steps must be at least 1".into(),
            ));
        }
        if !(self.target_goal.is_finite() && self.target_goal > 0.0) {
            return Err(RecoveryError::InvalidConfig(format!(
                "target goal must be positive, got {}",
                self.target_goal
            )));
        }
        if !(self.capital.is_finite() && self.capital > 0.0) {
            return Err(RecoveryError::InvalidConfig(format!(
                "capital must be positive, got {}",
                self.capital
            )));
        }
        let min = self.currency.min_amount();
        if !(self.base_amount >= min) {
            return Err(RecoveryError::BelowMinimum {
                amount: self.base_amount,
                min,
                currency: self.currency,
            });
        }
        Ok(())
    }

    /// Capital consumed by one full bust at this configuration.
    pub fn series_cost(&self) -> f64 {
        series_cost(self.base_amount, self.payout_rate, self.max_steps)
    }

    /// Whether a bust would consume more than the available capital.
    pub fn is_risky(&self) -> bool {
        self.series_cost() > self.capital
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base={:.2} {} | payout={:.0}% | steps={} | goal={:.2} | capital={:.2}",
            self.base_amount,
            self.currency,
            self.payout_rate * 100.0,
            self.max_steps,
            self.target_goal,
            self.capital,
        )
    }
}

// ---------------------------------------------------------------------------
// Session history
// ---------------------------------------------------------------------------

/// How a session was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionResult {
    Win,
    Bust,
}

impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionResult::Win => write!(f, "WIN"),
            SessionResult::Bust => write!(f, "BUST"),
        }
    }
}

/// One resolved session in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session: u64,
    pub result: SessionResult,
    /// Signed change to cumulative profit.
    pub profit_delta: f64,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session #{}: {} ({:+.2})",
            self.session, self.result, self.profit_delta
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for RecoveryPro.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("Base amount {amount:.2} is below the {currency} minimum of {min:.2}")]
    BelowMinimum {
        amount: f64,
        min: f64,
        currency: Currency,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
