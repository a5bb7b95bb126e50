//! Open position state.

use crate::plan::ExitPlan;
use crate::recommend::{ExitActions, PartialExit};
use chrono::{DateTime, Utc};
use fvg_core::{Bar, Direction, Price, TradeResult};
use tracing::info;

/// Mutable state of the single open position.
///
/// The exit plan is immutable; everything that changes while the trade
/// runs (current stop, partials, extremes, bar count) lives here.
#[derive(Debug, Clone)]
pub struct OpenPosition {
    pub trade_id: String,
    pub direction: Direction,
    pub entry: Price,
    /// Contracts still open.
    pub quantity: u32,
    pub plan: ExitPlan,
    pub current_stop: Price,
    /// Partial targets already filled (0, 1, or 2).
    pub partials_taken: u8,
    /// Completed bars since entry.
    pub bars_held: u32,
    /// Highest price seen since entry.
    pub highest: Price,
    /// Lowest price seen since entry.
    pub lowest: Price,
    pub opened_at: DateTime<Utc>,
}

impl OpenPosition {
    pub fn new(
        trade_id: String,
        direction: Direction,
        entry: Price,
        quantity: u32,
        plan: ExitPlan,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let current_stop = plan.initial_stop;
        Self {
            trade_id,
            direction,
            entry,
            quantity,
            plan,
            current_stop,
            partials_taken: 0,
            bars_held: 0,
            highest: entry,
            lowest: entry,
            opened_at,
        }
    }

    /// Advance on a completed bar: bar count and price extremes.
    pub fn on_bar(&mut self, bar: &Bar) {
        self.bars_held += 1;
        self.highest = self.highest.max(bar.high);
        self.lowest = self.lowest.min(bar.low);
    }

    /// Update price extremes from a tick.
    pub fn on_price(&mut self, price: Price) {
        self.highest = self.highest.max(price);
        self.lowest = self.lowest.min(price);
    }

    /// Whether the stop sits at or past the entry.
    pub fn stop_at_breakeven(&self) -> bool {
        match self.direction {
            Direction::Long => self.current_stop >= self.entry,
            Direction::Short => self.current_stop <= self.entry,
        }
    }

    /// Whether this price takes out the stop.
    pub fn stop_hit(&self, price: Price) -> bool {
        match self.direction {
            Direction::Long => price <= self.current_stop,
            Direction::Short => price >= self.current_stop,
        }
    }

    pub fn move_stop(&mut self, stop: Price) {
        info!(trade_id = %self.trade_id, old = %self.current_stop, new = %stop, "stop moved");
        self.current_stop = stop;
    }

    /// Fill a partial at its target. The tranche size is capped at
    /// what is still open.
    pub fn take_partial(&mut self, partial: &PartialExit) -> u32 {
        let filled = partial.quantity.min(self.quantity);
        self.quantity -= filled;
        self.partials_taken += 1;
        info!(
            trade_id = %self.trade_id,
            price = %partial.price,
            filled,
            remaining = self.quantity,
            "partial exit filled"
        );
        filled
    }

    /// Apply a recommendation's stop move and partial. A recommended
    /// close is the caller's to execute; it is not applied here.
    pub fn apply(&mut self, actions: &ExitActions) {
        if let Some(partial) = &actions.take_partial {
            self.take_partial(partial);
        }
        if let Some(stop) = actions.move_stop {
            self.move_stop(stop);
        }
    }

    /// Signed P/L in points per contract at the given exit price.
    pub fn pnl_points(&self, exit: Price) -> Price {
        self.direction.pnl_points(self.entry, exit)
    }

    /// Classify a close at the given price.
    pub fn classify_close(&self, exit: Price) -> TradeResult {
        TradeResult::from_pnl(self.pnl_points(exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExitConfig;
    use crate::plan::ExitPlanner;
    use rust_decimal_macros::dec;

    fn position() -> OpenPosition {
        let plan = ExitPlanner::new(ExitConfig::default())
            .create_plan(
                Direction::Long,
                Price::new(dec!(100)),
                Price::new(dec!(90)),
                Price::new(dec!(140)),
                10,
            )
            .unwrap();
        OpenPosition::new(
            "t1".to_string(),
            Direction::Long,
            Price::new(dec!(100)),
            10,
            plan,
            Utc::now(),
        )
    }

    #[test]
    fn test_bar_advances_extremes_and_count() {
        let mut pos = position();
        let bar = Bar::new(
            Price::new(dec!(100)),
            Price::new(dec!(112)),
            Price::new(dec!(97)),
            Price::new(dec!(110)),
            Utc::now(),
        );
        pos.on_bar(&bar);
        assert_eq!(pos.bars_held, 1);
        assert_eq!(pos.highest, Price::new(dec!(112)));
        assert_eq!(pos.lowest, Price::new(dec!(97)));

        pos.on_price(Price::new(dec!(115)));
        assert_eq!(pos.highest, Price::new(dec!(115)));
        assert_eq!(pos.bars_held, 1);
    }

    #[test]
    fn test_partials_reduce_quantity() {
        let mut pos = position();
        let filled = pos.take_partial(&PartialExit {
            price: Price::new(dec!(110)),
            quantity: 3,
        });
        assert_eq!(filled, 3);
        assert_eq!(pos.quantity, 7);
        assert_eq!(pos.partials_taken, 1);

        // A tranche never fills more than what remains.
        pos.quantity = 2;
        let filled = pos.take_partial(&PartialExit {
            price: Price::new(dec!(120)),
            quantity: 3,
        });
        assert_eq!(filled, 2);
        assert_eq!(pos.quantity, 0);
    }

    #[test]
    fn test_stop_hit_by_direction() {
        let pos = position();
        assert!(pos.stop_hit(Price::new(dec!(90))));
        assert!(pos.stop_hit(Price::new(dec!(89))));
        assert!(!pos.stop_hit(Price::new(dec!(91))));
    }

    #[test]
    fn test_close_classification() {
        let pos = position();
        assert_eq!(pos.classify_close(Price::new(dec!(120))), TradeResult::Win);
        assert_eq!(pos.classify_close(Price::new(dec!(91))), TradeResult::Loss);
        assert_eq!(
            pos.classify_close(Price::new(dec!(100))),
            TradeResult::Breakeven
        );
    }
}
