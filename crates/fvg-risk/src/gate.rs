//! The pre-trade risk gate.
//!
//! Every check returns a verdict, never an error: a blocked trade is a
//! routine outcome. The check order is fixed and short-circuits on the
//! first failing rule.

use crate::config::RiskLimits;
use crate::state::{RiskMetrics, RiskMode, RiskSnapshot};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use fvg_core::{Direction, Price, TradeProposal, TradeResult};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    /// All checks passed.
    Pass,
    /// Blocked with reason.
    Block(String),
}

impl GateVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Block(reason) => Some(reason),
        }
    }
}

/// Risk gate and daily state machine.
///
/// Owned by the orchestrator loop; all mutation goes through `&mut self`.
pub struct RiskGate {
    limits: RiskLimits,
    metrics: RiskMetrics,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            metrics: RiskMetrics::default(),
        }
    }

    /// Full pre-trade check list, in fixed order:
    /// halt, cooldown, daily trades, daily loss, consecutive losses,
    /// position size, stop distance, zero risk, risk/reward, confidence,
    /// stop side, target side, daily volume.
    pub fn check_pre_trade(
        &mut self,
        proposal: &TradeProposal,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> GateVerdict {
        if self.metrics.mode == RiskMode::Halted {
            return GateVerdict::Block(format!("Trading halted: {}", self.metrics.mode_reason));
        }

        if self.metrics.mode == RiskMode::Cooldown {
            let remaining = self.cooldown_remaining_secs(now);
            if remaining > 0 {
                return GateVerdict::Block(format!("In cooldown: {remaining}s remaining"));
            }
            self.metrics.mode = RiskMode::Normal;
            self.metrics.mode_reason.clear();
        }

        if self.metrics.daily_trades >= self.limits.max_daily_trades {
            return GateVerdict::Block(format!(
                "Daily trade limit reached ({})",
                self.limits.max_daily_trades
            ));
        }

        if self.metrics.daily_pnl <= -self.limits.max_daily_loss {
            self.halt("Daily loss limit reached");
            return GateVerdict::Block(format!(
                "Daily loss limit reached ({}pts)",
                self.limits.max_daily_loss
            ));
        }

        if self.metrics.consecutive_losses >= self.limits.max_consecutive_losses {
            self.halt("Consecutive loss limit reached");
            return GateVerdict::Block(format!(
                "Consecutive loss limit ({})",
                self.limits.max_consecutive_losses
            ));
        }

        if quantity > self.limits.max_position_size {
            return GateVerdict::Block(format!(
                "Position size {} exceeds max {}",
                quantity, self.limits.max_position_size
            ));
        }

        let stop_distance = proposal.stop_distance();
        if stop_distance < self.limits.stop_loss_min {
            return GateVerdict::Block(format!(
                "Stop too tight: {}pts (min: {})",
                stop_distance, self.limits.stop_loss_min
            ));
        }
        if stop_distance > self.limits.stop_loss_max {
            return GateVerdict::Block(format!(
                "Stop too wide: {}pts (max: {})",
                stop_distance, self.limits.stop_loss_max
            ));
        }

        // Guard before the ratio: a stop at the entry has no risk to
        // measure and must never reach the division below.
        if stop_distance.is_zero() {
            return GateVerdict::Block("Zero risk: stop equals entry".to_string());
        }

        let risk_reward = proposal.target_distance().inner() / stop_distance.inner();
        if risk_reward < self.limits.min_risk_reward {
            return GateVerdict::Block(format!(
                "R/R {:.2} below min {}",
                risk_reward, self.limits.min_risk_reward
            ));
        }

        if proposal.confidence < self.limits.confidence_threshold {
            return GateVerdict::Block(format!(
                "Confidence {} below threshold {}",
                proposal.confidence, self.limits.confidence_threshold
            ));
        }

        match proposal.direction {
            Direction::Long if proposal.stop >= proposal.entry => {
                return GateVerdict::Block("LONG stop must be below entry".to_string());
            }
            Direction::Short if proposal.stop <= proposal.entry => {
                return GateVerdict::Block("SHORT stop must be above entry".to_string());
            }
            _ => {}
        }

        match proposal.direction {
            Direction::Long if proposal.target <= proposal.entry => {
                return GateVerdict::Block("LONG target must be above entry".to_string());
            }
            Direction::Short if proposal.target >= proposal.entry => {
                return GateVerdict::Block("SHORT target must be below entry".to_string());
            }
            _ => {}
        }

        if self.metrics.daily_volume + quantity > self.limits.max_daily_volume {
            return GateVerdict::Block(format!(
                "Daily volume limit would be exceeded ({})",
                self.limits.max_daily_volume
            ));
        }

        info!(
            direction = %proposal.direction,
            quantity,
            entry = %proposal.entry,
            "pre-trade check passed"
        );
        GateVerdict::Pass
    }

    /// Quick halt/cooldown/trade-count check, without a proposal.
    pub fn can_trade(&mut self, now: DateTime<Utc>) -> GateVerdict {
        if self.metrics.mode == RiskMode::Halted {
            return GateVerdict::Block(self.metrics.mode_reason.clone());
        }
        if self.metrics.mode == RiskMode::Cooldown {
            let remaining = self.cooldown_remaining_secs(now);
            if remaining > 0 {
                return GateVerdict::Block(format!("Cooldown: {remaining}s remaining"));
            }
            self.metrics.mode = RiskMode::Normal;
            self.metrics.mode_reason.clear();
        }
        if self.metrics.daily_trades >= self.limits.max_daily_trades {
            return GateVerdict::Block("Daily trade limit reached".to_string());
        }
        GateVerdict::Pass
    }

    /// Record a filled entry.
    pub fn record_entry(
        &mut self,
        trade_id: &str,
        direction: Direction,
        quantity: u32,
        now: DateTime<Utc>,
    ) {
        self.metrics.daily_trades += 1;
        self.metrics.daily_volume += quantity;
        self.metrics.open_positions += 1;
        self.metrics.last_trade_at = Some(now);
        info!(trade_id, %direction, quantity, "trade entry recorded");
        self.warn_approaching_limits();
    }

    /// Record a closed trade. Updates P/L, equity, drawdown, and the
    /// loss streak, starts the cooldown on a loss, then re-evaluates
    /// the halt conditions. Returns the signed P/L in points.
    #[allow(clippy::too_many_arguments)]
    pub fn record_exit(
        &mut self,
        trade_id: &str,
        direction: Direction,
        entry: Price,
        exit: Price,
        quantity: u32,
        result: TradeResult,
        now: DateTime<Utc>,
    ) -> Price {
        let pnl = direction.pnl_points(entry, exit) * Decimal::from(quantity);

        self.metrics.daily_pnl = self.metrics.daily_pnl + pnl;
        self.metrics.open_positions = self.metrics.open_positions.saturating_sub(1);

        match result {
            TradeResult::Win => {
                self.metrics.daily_wins += 1;
                self.metrics.consecutive_losses = 0;
            }
            TradeResult::Loss => {
                self.metrics.daily_losses += 1;
                self.metrics.consecutive_losses += 1;
                self.metrics.last_loss_at = Some(now);
                self.start_cooldown();
            }
            TradeResult::Breakeven => {}
        }

        self.metrics.current_equity = self.metrics.current_equity + pnl;
        if self.metrics.current_equity > self.metrics.peak_equity {
            self.metrics.peak_equity = self.metrics.current_equity;
        }
        if self.metrics.peak_equity.is_positive() {
            self.metrics.drawdown_pct = (self.metrics.peak_equity - self.metrics.current_equity)
                .inner()
                / self.metrics.peak_equity.inner()
                * Decimal::from(100);
        }

        info!(
            trade_id,
            %direction,
            %entry,
            %exit,
            pnl = %pnl,
            result = %result,
            "trade closed"
        );

        self.check_halt_limits();
        pnl
    }

    /// Manually resume after a halt. Returns whether anything changed.
    pub fn resume(&mut self) -> bool {
        if self.metrics.mode != RiskMode::Halted {
            return false;
        }
        info!("trading resumed by manual intervention");
        self.metrics.mode = RiskMode::Normal;
        self.metrics.mode_reason.clear();
        true
    }

    /// Start a new session day: daily counters reset, a halt clears.
    /// The loss streak, equity, and drawdown carry over.
    pub fn roll_day(&mut self) {
        self.metrics.daily_trades = 0;
        self.metrics.daily_pnl = Price::ZERO;
        self.metrics.daily_wins = 0;
        self.metrics.daily_losses = 0;
        self.metrics.daily_volume = 0;
        if self.metrics.mode == RiskMode::Halted {
            info!("new session day, halt cleared");
            self.metrics.mode = RiskMode::Normal;
            self.metrics.mode_reason.clear();
        }
    }

    /// Position size after throttling: capped at the max, halved after
    /// two consecutive losses, halved again on the last allowed trade
    /// of the day. The reductions compound, floored at one contract.
    pub fn suggested_size(&self, base: u32) -> u32 {
        let mut size = base.min(self.limits.max_position_size);
        if self.metrics.consecutive_losses >= 2 {
            size = (size / 2).max(1);
            info!(
                consecutive_losses = self.metrics.consecutive_losses,
                size, "position size reduced after loss streak"
            );
        }
        if self.metrics.daily_trades >= self.limits.max_daily_trades.saturating_sub(1) {
            size = (size / 2).max(1);
        }
        size
    }

    /// Restore from a persisted snapshot. A snapshot from an earlier
    /// day still contributes its loss streak and equity; its daily
    /// counters are rolled.
    pub fn restore(&mut self, snapshot: RiskSnapshot, today: NaiveDate) {
        let stale = snapshot.date != today;
        self.metrics = snapshot.metrics;
        if stale {
            self.roll_day();
        }
        info!(
            daily_trades = self.metrics.daily_trades,
            daily_pnl = %self.metrics.daily_pnl,
            mode = %self.metrics.mode,
            stale,
            "risk state restored"
        );
    }

    pub fn snapshot(&self, date: NaiveDate) -> RiskSnapshot {
        RiskSnapshot {
            date,
            metrics: self.metrics.clone(),
        }
    }

    pub fn metrics(&self) -> &RiskMetrics {
        &self.metrics
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Human-readable status block for the log.
    pub fn summary(&self) -> String {
        let win_rate = self
            .metrics
            .win_rate()
            .map(|r| format!("{r:.0}%"))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "mode: {} | trades: {}/{} | P/L: {}pts | streak: {} losses | \
             equity: {} (peak {}) | drawdown: {:.1}% | win rate: {}",
            self.metrics.mode,
            self.metrics.daily_trades,
            self.limits.max_daily_trades,
            self.metrics.daily_pnl,
            self.metrics.consecutive_losses,
            self.metrics.current_equity,
            self.metrics.peak_equity,
            self.metrics.drawdown_pct,
            win_rate,
        )
    }

    fn cooldown_remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        let Some(last_loss) = self.metrics.last_loss_at else {
            return 0;
        };
        let end = last_loss + Duration::minutes(self.limits.cooldown_minutes);
        (end - now).num_seconds().max(0)
    }

    fn start_cooldown(&mut self) {
        if self.limits.cooldown_minutes > 0 && self.metrics.mode != RiskMode::Halted {
            self.metrics.mode = RiskMode::Cooldown;
            self.metrics.mode_reason =
                format!("Cooldown after loss ({} min)", self.limits.cooldown_minutes);
            warn!(minutes = self.limits.cooldown_minutes, "cooldown started");
        }
    }

    fn halt(&mut self, reason: &str) {
        self.metrics.mode = RiskMode::Halted;
        self.metrics.mode_reason = reason.to_string();
        error!(reason, "TRADING HALTED");
    }

    fn check_halt_limits(&mut self) {
        if self.metrics.daily_pnl <= -self.limits.max_daily_loss {
            self.halt("Daily loss limit reached");
            return;
        }
        if self.metrics.consecutive_losses >= self.limits.max_consecutive_losses {
            self.halt("Consecutive loss limit reached");
            return;
        }
        if self.metrics.drawdown_pct >= self.limits.max_drawdown_pct {
            self.halt("Maximum drawdown reached");
        }
    }

    fn warn_approaching_limits(&self) {
        if self.metrics.daily_trades >= self.limits.max_daily_trades.saturating_sub(1) {
            warn!(
                daily_trades = self.metrics.daily_trades,
                limit = self.limits.max_daily_trades,
                "approaching daily trade limit"
            );
        }
        let loss_threshold = self.limits.max_daily_loss * Decimal::new(8, 1);
        if self.metrics.daily_pnl.is_negative() && self.metrics.daily_pnl.abs() >= loss_threshold {
            warn!(
                daily_pnl = %self.metrics.daily_pnl,
                limit = %self.limits.max_daily_loss,
                "approaching daily loss limit"
            );
        }
        if self.metrics.consecutive_losses
            >= self.limits.max_consecutive_losses.saturating_sub(1)
        {
            warn!(
                consecutive_losses = self.metrics.consecutive_losses,
                limit = self.limits.max_consecutive_losses,
                "approaching consecutive loss limit"
            );
        }
        let drawdown_threshold = self.limits.max_drawdown_pct * Decimal::new(7, 1);
        if self.metrics.drawdown_pct >= drawdown_threshold {
            warn!(
                drawdown_pct = %self.metrics.drawdown_pct,
                limit = %self.limits.max_drawdown_pct,
                "approaching drawdown limit"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limits() -> RiskLimits {
        RiskLimits::default()
    }

    fn long_proposal() -> TradeProposal {
        TradeProposal {
            direction: Direction::Long,
            entry: Price::new(dec!(100)),
            stop: Price::new(dec!(80)),
            target: Price::new(dec!(160)),
            confidence: dec!(0.8),
            reasoning: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn lose(gate: &mut RiskGate, at: DateTime<Utc>) {
        // Long from 100 closed at 80: -20 points.
        gate.record_exit(
            "t",
            Direction::Long,
            Price::new(dec!(100)),
            Price::new(dec!(80)),
            1,
            TradeResult::Loss,
            at,
        );
    }

    #[test]
    fn test_valid_proposal_passes() {
        let mut gate = RiskGate::new(limits());
        assert!(gate.check_pre_trade(&long_proposal(), 2, now()).is_pass());
    }

    #[test]
    fn test_three_losses_halt_trading() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        lose(&mut gate, t);
        lose(&mut gate, t);
        assert_eq!(gate.metrics().mode, RiskMode::Cooldown);
        lose(&mut gate, t);
        assert_eq!(gate.metrics().mode, RiskMode::Halted);
        assert_eq!(gate.metrics().consecutive_losses, 3);

        let verdict = gate.check_pre_trade(&long_proposal(), 1, t);
        assert!(verdict.is_block());
        assert!(verdict.reason().unwrap().contains("halted"));

        // Only a manual resume clears the halt within the day.
        assert!(gate.resume());
        assert!(!gate.resume());
        assert_eq!(gate.metrics().mode, RiskMode::Normal);
    }

    #[test]
    fn test_daily_loss_halts() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        // A single -105 point hit breaches the 100-point daily limit.
        gate.record_exit(
            "t",
            Direction::Short,
            Price::new(dec!(200)),
            Price::new(dec!(305)),
            1,
            TradeResult::Loss,
            t,
        );
        assert_eq!(gate.metrics().daily_pnl, Price::new(dec!(-105)));
        assert_eq!(gate.metrics().mode, RiskMode::Halted);
    }

    #[test]
    fn test_cooldown_blocks_then_expires() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        lose(&mut gate, t);

        let verdict = gate.check_pre_trade(&long_proposal(), 1, t);
        assert!(verdict.reason().unwrap().contains("cooldown"));

        // 16 minutes later the cooldown has lapsed.
        let later = t + Duration::minutes(16);
        assert!(gate.check_pre_trade(&long_proposal(), 1, later).is_pass());
        assert_eq!(gate.metrics().mode, RiskMode::Normal);
    }

    #[test]
    fn test_win_resets_loss_streak() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        lose(&mut gate, t);
        lose(&mut gate, t);
        assert_eq!(gate.metrics().consecutive_losses, 2);
        gate.record_exit(
            "t",
            Direction::Long,
            Price::new(dec!(100)),
            Price::new(dec!(150)),
            1,
            TradeResult::Win,
            t,
        );
        assert_eq!(gate.metrics().consecutive_losses, 0);
        assert_eq!(gate.metrics().daily_wins, 1);
    }

    #[test]
    fn test_drawdown_halts() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        // Build a 100-point peak, then give back 6%.
        gate.record_exit(
            "t",
            Direction::Long,
            Price::new(dec!(100)),
            Price::new(dec!(200)),
            1,
            TradeResult::Win,
            t,
        );
        gate.record_exit(
            "t",
            Direction::Long,
            Price::new(dec!(100)),
            Price::new(dec!(94)),
            1,
            TradeResult::Loss,
            t,
        );
        assert_eq!(gate.metrics().drawdown_pct, dec!(6));
        assert_eq!(gate.metrics().mode, RiskMode::Halted);
    }

    #[test]
    fn test_zero_risk_rejected_without_division() {
        let mut gate = RiskGate::new(RiskLimits {
            stop_loss_min: Price::ZERO,
            ..limits()
        });
        let mut p = long_proposal();
        p.stop = p.entry;
        let verdict = gate.check_pre_trade(&p, 1, now());
        assert!(verdict.reason().unwrap().contains("Zero risk"));
    }

    #[test]
    fn test_stop_distance_bounds() {
        let mut gate = RiskGate::new(limits());
        let mut p = long_proposal();
        p.stop = Price::new(dec!(95)); // 5 points, min is 15
        assert!(gate
            .check_pre_trade(&p, 1, now())
            .reason()
            .unwrap()
            .contains("too tight"));
        p.stop = Price::new(dec!(40)); // 60 points, max is 50
        assert!(gate
            .check_pre_trade(&p, 1, now())
            .reason()
            .unwrap()
            .contains("too wide"));
    }

    #[test]
    fn test_wrong_side_stop_and_target() {
        let mut gate = RiskGate::new(RiskLimits {
            min_risk_reward: dec!(0.1),
            ..limits()
        });
        let mut p = long_proposal();
        p.stop = Price::new(dec!(120));
        assert!(gate
            .check_pre_trade(&p, 1, now())
            .reason()
            .unwrap()
            .contains("stop must be below"));

        let mut p = long_proposal();
        p.stop = Price::new(dec!(80));
        p.target = Price::new(dec!(90));
        assert!(gate
            .check_pre_trade(&p, 1, now())
            .reason()
            .unwrap()
            .contains("target must be above"));
    }

    #[test]
    fn test_daily_volume_cap() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        gate.record_entry("t", Direction::Long, 45, t);
        assert_eq!(gate.metrics().daily_volume, 45);
        // Ten more contracts would push the day to 55 of 50.
        let verdict = gate.check_pre_trade(&long_proposal(), 10, t);
        assert!(verdict.reason().unwrap().contains("volume"));
        // Five still fit.
        assert!(gate.check_pre_trade(&long_proposal(), 5, t).is_pass());
    }

    #[test]
    fn test_size_reductions_compound() {
        let mut gate = RiskGate::new(limits());
        assert_eq!(gate.suggested_size(8), 8);
        assert_eq!(gate.suggested_size(20), 10); // capped

        let t = now();
        lose(&mut gate, t);
        lose(&mut gate, t);
        assert_eq!(gate.suggested_size(8), 4);

        // At the last allowed trade of the day the halving compounds.
        gate.metrics.daily_trades = gate.limits.max_daily_trades - 1;
        assert_eq!(gate.suggested_size(8), 2);
        assert_eq!(gate.suggested_size(1), 1); // floored
    }

    #[test]
    fn test_daily_trade_limit() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        for _ in 0..5 {
            gate.record_entry("t", Direction::Long, 1, t);
        }
        let verdict = gate.check_pre_trade(&long_proposal(), 1, t);
        assert!(verdict.reason().unwrap().contains("Daily trade limit"));
        assert!(gate.can_trade(t).is_block());
    }

    #[test]
    fn test_roll_day_resets_dailies_keeps_streak() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        gate.record_entry("t", Direction::Long, 2, t);
        lose(&mut gate, t);
        lose(&mut gate, t);
        lose(&mut gate, t);
        assert_eq!(gate.metrics().mode, RiskMode::Halted);

        gate.roll_day();
        let m = gate.metrics();
        assert_eq!(m.mode, RiskMode::Normal);
        assert_eq!(m.daily_trades, 0);
        assert_eq!(m.daily_pnl, Price::ZERO);
        assert_eq!(m.daily_volume, 0);
        // The streak and equity survive the rollover.
        assert_eq!(m.consecutive_losses, 3);
        assert_eq!(m.current_equity, Price::new(dec!(-60)));
    }

    #[test]
    fn test_restore_stale_snapshot_rolls_day() {
        let mut gate = RiskGate::new(limits());
        let t = now();
        gate.record_entry("t", Direction::Long, 2, t);
        lose(&mut gate, t);

        let yesterday = NaiveDate::from_ymd_opt(2025, 3, 13).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let snap = gate.snapshot(yesterday);

        let mut fresh = RiskGate::new(limits());
        fresh.restore(snap.clone(), today);
        assert_eq!(fresh.metrics().daily_trades, 0);
        assert_eq!(fresh.metrics().consecutive_losses, 1);

        let mut same_day = RiskGate::new(limits());
        same_day.restore(snap, yesterday);
        assert_eq!(same_day.metrics().daily_trades, 1);
    }

    #[test]
    fn test_short_pnl_sign() {
        let mut gate = RiskGate::new(limits());
        let pnl = gate.record_exit(
            "t",
            Direction::Short,
            Price::new(dec!(100)),
            Price::new(dec!(90)),
            3,
            TradeResult::Win,
            now(),
        );
        assert_eq!(pnl, Price::new(dec!(30)));
    }
}
