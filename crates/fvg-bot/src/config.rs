//! Application configuration.

use crate::decision::DecisionConfig;
use crate::error::AppResult;
use fvg_position::ExitConfig;
use fvg_risk::RiskLimits;
use fvg_zones::ZoneConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bar and price feed files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Completed-bar CSV, re-read whenever its mtime changes.
    #[serde(default = "default_bars_path")]
    pub bars_path: String,
    /// Live tick CSV; the last row carries the current price.
    #[serde(default = "default_live_path")]
    pub live_path: String,
    /// Loop interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_bars_path() -> String {
    "data/HistoricalData.csv".to_string()
}

fn default_live_path() -> String {
    "data/LiveFeed.csv".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            bars_path: default_bars_path(),
            live_path: default_live_path(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Output and state file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Signal CSV consumed by the execution platform.
    #[serde(default = "default_signals_path")]
    pub signals_path: String,
    /// Risk snapshot file.
    #[serde(default = "default_state_path")]
    pub state_path: String,
}

fn default_signals_path() -> String {
    "data/trade_signals.csv".to_string()
}

fn default_state_path() -> String {
    "data/risk_state.json".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            signals_path: default_signals_path(),
            state_path: default_state_path(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub zones: ZoneConfig,
    #[serde(default)]
    pub risk: RiskLimits,
    #[serde(default)]
    pub exits: ExitConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fvg_core::Price;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.feed.poll_interval_secs, 5);
        assert_eq!(config.risk.max_daily_trades, 5);
        assert_eq!(config.zones.min_gap_size, Price::new(dec!(5)));
        assert_eq!(config.exits.time_limit_bars, 20);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [feed]
            bars_path = "feeds/nq_hourly.csv"
            poll_interval_secs = 2

            [risk]
            max_daily_trades = 3
            max_daily_loss = "150"

            [zones]
            min_gap_size = "8"
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.bars_path, "feeds/nq_hourly.csv");
        assert_eq!(config.risk.max_daily_trades, 3);
        assert_eq!(config.risk.max_daily_loss, Price::new(dec!(150)));
        assert_eq!(config.zones.min_gap_size, Price::new(dec!(8)));
        // Untouched sections keep their defaults.
        assert_eq!(config.risk.max_consecutive_losses, 3);
    }
}
