//! Risk limit configuration.

use fvg_core::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hard risk limits. Every limit here is enforced by the gate before a
/// signal can be generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Maximum trades per session day.
    #[serde(default = "default_max_daily_trades")]
    pub max_daily_trades: u32,
    /// Maximum daily loss in points before trading halts.
    #[serde(default = "default_max_daily_loss")]
    pub max_daily_loss: Price,
    /// Consecutive losses before trading halts.
    #[serde(default = "default_max_consecutive_losses")]
    pub max_consecutive_losses: u32,
    /// Maximum contracts per trade.
    #[serde(default = "default_max_position_size")]
    pub max_position_size: u32,
    /// Minimum stop distance in points. Tighter stops are noise stops.
    #[serde(default = "default_stop_loss_min")]
    pub stop_loss_min: Price,
    /// Maximum stop distance in points.
    #[serde(default = "default_stop_loss_max")]
    pub stop_loss_max: Price,
    /// Minimum risk/reward ratio.
    #[serde(default = "default_min_risk_reward")]
    pub min_risk_reward: Decimal,
    /// Minimum decision confidence in [0, 1].
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: Decimal,
    /// Maximum drawdown from peak equity, in percent, before halting.
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,
    /// Cooldown after a losing trade, in minutes. Zero disables it.
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,
    /// Maximum total contracts traded per day.
    #[serde(default = "default_max_daily_volume")]
    pub max_daily_volume: u32,
}

fn default_max_daily_trades() -> u32 {
    5
}

fn default_max_daily_loss() -> Price {
    Price::new(Decimal::from(100))
}

fn default_max_consecutive_losses() -> u32 {
    3
}

fn default_max_position_size() -> u32 {
    10
}

fn default_stop_loss_min() -> Price {
    Price::new(Decimal::from(15))
}

fn default_stop_loss_max() -> Price {
    Price::new(Decimal::from(50))
}

fn default_min_risk_reward() -> Decimal {
    Decimal::from(3)
}

fn default_confidence_threshold() -> Decimal {
    Decimal::new(65, 2)
}

fn default_max_drawdown_pct() -> Decimal {
    Decimal::from(5)
}

fn default_cooldown_minutes() -> i64 {
    15
}

fn default_max_daily_volume() -> u32 {
    50
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_daily_trades: default_max_daily_trades(),
            max_daily_loss: default_max_daily_loss(),
            max_consecutive_losses: default_max_consecutive_losses(),
            max_position_size: default_max_position_size(),
            stop_loss_min: default_stop_loss_min(),
            stop_loss_max: default_stop_loss_max(),
            min_risk_reward: default_min_risk_reward(),
            confidence_threshold: default_confidence_threshold(),
            max_drawdown_pct: default_max_drawdown_pct(),
            cooldown_minutes: default_cooldown_minutes(),
            max_daily_volume: default_max_daily_volume(),
        }
    }
}
