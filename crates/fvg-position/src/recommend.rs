//! Per-tick exit recommendations for an open position.
//!
//! Priority order: reversal close, time exit, then partial exits and
//! stop management. A partial and a stop move can be recommended in
//! the same call; a close preempts everything else.

use crate::plan::ExitPlanner;
use crate::tracker::OpenPosition;
use fvg_core::{Bar, Direction, Price};
use rust_decimal::Decimal;
use std::fmt;
use tracing::{info, warn};

/// Losing positions deeper than this many points are held through the
/// time limit instead of being cut; a deep loser gets its chance to
/// come back while a small one is cleaned up.
const SMALL_LOSS_CUTOFF_PTS: i64 = 10;

/// Minimum bar range for the momentum reversal signal.
const MOMENTUM_RANGE_PTS: i64 = 15;

/// Stop buffer past the entry on the breakeven move.
const BREAKEVEN_BUFFER_PTS: i64 = 1;

/// Why a position should be closed at market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Market structure reversed against the position.
    Reversal,
    /// Held past the time limit without reaching the runner target.
    TimeLimit { bars_held: u32 },
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reversal => write!(f, "reversal detected"),
            Self::TimeLimit { bars_held } => write!(f, "time exit after {bars_held} bars"),
        }
    }
}

/// A partial profit-take at a plan target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialExit {
    pub price: Price,
    pub quantity: u32,
}

/// Actions recommended for the current tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExitActions {
    pub move_stop: Option<Price>,
    pub take_partial: Option<PartialExit>,
    pub close: Option<CloseReason>,
}

impl ExitActions {
    pub fn is_empty(&self) -> bool {
        self.move_stop.is_none() && self.take_partial.is_none() && self.close.is_none()
    }
}

/// Market context for a recommendation tick.
pub struct ExitContext<'a> {
    /// Last traded price.
    pub price: Price,
    /// Current 75-period EMA, if the feed provides it.
    pub ema75: Option<Price>,
    /// Recent completed bars, oldest first. The reversal checks need
    /// at least three.
    pub recent_bars: &'a [Bar],
}

impl ExitPlanner {
    /// Recommend exit actions for an open position.
    pub fn recommend(&self, position: &OpenPosition, ctx: &ExitContext<'_>) -> ExitActions {
        let mut actions = ExitActions::default();
        let pnl = position
            .direction
            .pnl_points(position.entry, ctx.price);

        if detect_reversal(position.direction, ctx) {
            actions.close = Some(CloseReason::Reversal);
            return actions;
        }

        if time_exit_due(position.bars_held, position.plan.time_limit_bars, pnl) {
            actions.close = Some(CloseReason::TimeLimit {
                bars_held: position.bars_held,
            });
            return actions;
        }

        actions.take_partial = check_partial(position, ctx.price);

        if should_move_to_breakeven(position, ctx.price) {
            let buffer = Price::new(Decimal::from(BREAKEVEN_BUFFER_PTS));
            let stop = match position.direction {
                Direction::Long => position.entry + buffer,
                Direction::Short => position.entry - buffer,
            };
            info!(new_stop = %stop, "moving stop to breakeven");
            actions.move_stop = Some(stop);
        } else if position.stop_at_breakeven() && trailing_active(position, ctx.price) {
            actions.move_stop = trailing_stop(position, ctx.price);
        }

        actions
    }
}

/// The time limit closes winners and small losers. A position deeper
/// than the cutoff is held for a comeback.
fn time_exit_due(bars_held: u32, limit: u32, pnl: Price) -> bool {
    if bars_held < limit {
        return false;
    }
    let cutoff = Price::new(Decimal::from(-SMALL_LOSS_CUTOFF_PTS));
    if pnl >= Price::ZERO || pnl > cutoff {
        info!(bars_held, pnl = %pnl, "time exit due");
        return true;
    }
    false
}

fn detect_reversal(direction: Direction, ctx: &ExitContext<'_>) -> bool {
    let [.., prev, last] = ctx.recent_bars else {
        return false;
    };
    if ctx.recent_bars.len() < 3 {
        return false;
    }

    // EMA recross: the previous bar closed on the right side of the
    // 75 EMA and the market is now on the wrong side of it.
    if let Some(ema75) = ctx.ema75 {
        let crossed = match direction {
            Direction::Long => ctx.price < ema75 && prev.close > ema75,
            Direction::Short => ctx.price > ema75 && prev.close < ema75,
        };
        if crossed {
            warn!(%ema75, price = %ctx.price, "reversal: 75 EMA recross");
            return true;
        }
    }

    // Strong momentum bar against the position.
    if last.range() > Price::new(Decimal::from(MOMENTUM_RANGE_PTS)) {
        if let Some(ratio) = last.body_ratio() {
            let against = match direction {
                Direction::Long => last.is_bearish(),
                Direction::Short => last.is_bullish(),
            };
            if against && ratio > Decimal::new(75, 2) {
                warn!(range = %last.range(), "reversal: momentum bar against position");
                return true;
            }
        }
    }

    false
}

fn check_partial(position: &OpenPosition, price: Price) -> Option<PartialExit> {
    if position.partials_taken >= 2 {
        return None; // only the runner left
    }
    let (target, quantity) = if position.partials_taken == 0 {
        (position.plan.target1, position.plan.partial_sizes.0)
    } else {
        (position.plan.target2, position.plan.partial_sizes.1)
    };
    let touched = match position.direction {
        Direction::Long => price >= target,
        Direction::Short => price <= target,
    };
    if touched {
        info!(tranche = position.partials_taken + 1, %target, quantity, "partial exit triggered");
        return Some(PartialExit {
            price: target,
            quantity,
        });
    }
    None
}

fn should_move_to_breakeven(position: &OpenPosition, price: Price) -> bool {
    if position.stop_at_breakeven() {
        return false;
    }
    match position.direction {
        Direction::Long => price >= position.plan.breakeven_trigger,
        Direction::Short => price <= position.plan.breakeven_trigger,
    }
}

fn trailing_active(position: &OpenPosition, price: Price) -> bool {
    match position.direction {
        Direction::Long => price >= position.plan.trailing_trigger,
        Direction::Short => price <= position.plan.trailing_trigger,
    }
}

/// Trail behind the favorable extreme. The stop only ever tightens and
/// never crosses the market.
fn trailing_stop(position: &OpenPosition, price: Price) -> Option<Price> {
    match position.direction {
        Direction::Long => {
            let new_stop = position.highest - position.plan.trailing_offset;
            if new_stop > position.current_stop && new_stop < price {
                info!(old = %position.current_stop, new = %new_stop, "trailing stop tightened");
                return Some(new_stop);
            }
        }
        Direction::Short => {
            let new_stop = position.lowest + position.plan.trailing_offset;
            if new_stop < position.current_stop && new_stop > price {
                info!(old = %position.current_stop, new = %new_stop, "trailing stop tightened");
                return Some(new_stop);
            }
        }
    }
    None
}
