//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default matching the setup form, so a missing file or a
//! partial file is fine. The payout is written as a percentage (92) and
//! converted to a rate (0.92) when the strategy config is built.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::strategy::series::{DEFAULT_MAX_STEPS, DEFAULT_PAYOUT};
use crate::types::{Currency, StrategyConfig};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: StrategySettings,
    pub display: DisplaySettings,
}

/// Raw strategy inputs as a user would enter them.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StrategySettings {
    pub currency: Currency,
    /// `None` means "use the currency minimum".
    pub base_amount: Option<f64>,
    pub target_goal: f64,
    pub capital: f64,
    /// Payout as a percentage, e.g. 92.
    pub payout_pct: f64,
    pub max_steps: usize,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            base_amount: None,
            target_goal: 50.0,
            capital: 1000.0,
            payout_pct: DEFAULT_PAYOUT * 100.0,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    /// Print the per-step table after every event in interactive mode.
    pub show_steps: bool,
    /// Number of history rows shown by `status`.
    pub history_rows: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_steps: true,
            history_rows: 10,
        }
    }
}

impl StrategySettings {
    pub fn payout_rate(&self) -> f64 {
        self.payout_pct / 100.0
    }

    /// Base amount, falling back to the currency minimum.
    pub fn base_amount_or_min(&self) -> f64 {
        self.base_amount.unwrap_or_else(|| self.currency.min_amount())
    }

    /// Validate and convert into a [`StrategyConfig`].
    pub fn to_strategy(&self) -> Result<StrategyConfig> {
        let config = StrategyConfig::new(
            self.base_amount_or_min(),
            self.payout_rate(),
            self.max_steps,
            self.target_goal,
            self.capital,
            self.currency,
        )
        .context("Invalid strategy settings")?;
        Ok(config)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            let config = Self::load(path)?;
            info!(path, "Configuration loaded");
            Ok(config)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }
}
