//! Risk state machine modes and the daily metrics record.

use chrono::{DateTime, NaiveDate, Utc};
use fvg_core::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading permission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    /// Trading allowed.
    Normal,
    /// Temporarily paused after a loss; expires by clock.
    Cooldown,
    /// Hard stop. Clears only on manual resume or day rollover.
    Halted,
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Cooldown => write!(f, "cooldown"),
            Self::Halted => write!(f, "halted"),
        }
    }
}

/// Running risk metrics for the current session day.
///
/// Daily counters reset on rollover; `consecutive_losses`, equity, and
/// drawdown carry across days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub mode: RiskMode,
    /// Why the gate is in its current non-Normal mode.
    #[serde(default)]
    pub mode_reason: String,
    pub daily_trades: u32,
    pub daily_pnl: Price,
    pub daily_wins: u32,
    pub daily_losses: u32,
    pub consecutive_losses: u32,
    pub peak_equity: Price,
    pub current_equity: Price,
    /// Percent off peak equity.
    pub drawdown_pct: Decimal,
    pub open_positions: u32,
    pub daily_volume: u32,
    #[serde(default)]
    pub last_trade_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_loss_at: Option<DateTime<Utc>>,
}

impl Default for RiskMetrics {
    fn default() -> Self {
        Self {
            mode: RiskMode::Normal,
            mode_reason: String::new(),
            daily_trades: 0,
            daily_pnl: Price::ZERO,
            daily_wins: 0,
            daily_losses: 0,
            consecutive_losses: 0,
            peak_equity: Price::ZERO,
            current_equity: Price::ZERO,
            drawdown_pct: Decimal::ZERO,
            open_positions: 0,
            daily_volume: 0,
            last_trade_at: None,
            last_loss_at: None,
        }
    }
}

impl RiskMetrics {
    /// Win rate over today's closed trades, if any closed.
    pub fn win_rate(&self) -> Option<Decimal> {
        let closed = self.daily_wins + self.daily_losses;
        if closed == 0 {
            return None;
        }
        Some(Decimal::from(self.daily_wins) / Decimal::from(closed) * Decimal::from(100))
    }
}

/// Date-stamped metrics snapshot for persistence across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub date: NaiveDate,
    pub metrics: RiskMetrics,
}
