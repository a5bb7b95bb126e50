//! Scaled exit plan construction.

use crate::config::ExitConfig;
use crate::error::{PositionError, Result};
use fvg_core::{Direction, Price};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Immutable exit plan built once at entry.
///
/// Mutable position state (current stop, partials taken, bars held)
/// lives in [`crate::OpenPosition`], never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitPlan {
    pub initial_stop: Price,
    /// First partial target.
    pub target1: Price,
    /// Second partial target.
    pub target2: Price,
    /// Runner target.
    pub target3: Price,
    /// Price at which the stop moves to breakeven.
    pub breakeven_trigger: Price,
    /// Price at which trailing starts.
    pub trailing_trigger: Price,
    /// Points the stop trails behind the favorable extreme.
    pub trailing_offset: Price,
    pub time_limit_bars: u32,
    /// Contracts for target 1, target 2, and the runner.
    pub partial_sizes: (u32, u32, u32),
}

/// Builds exit plans and produces exit recommendations.
pub struct ExitPlanner {
    config: ExitConfig,
}

impl ExitPlanner {
    pub fn new(config: ExitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExitConfig {
        &self.config
    }

    /// Build a scaled plan from the entry, stop, and position size.
    ///
    /// All levels are R-multiples of the entry-to-stop distance; the
    /// proposal's own target only shapes the original risk/reward check
    /// and is logged here for reference. Partial sizes are floored at
    /// one contract each and the runner takes the remainder, which is
    /// deliberately not rebalanced.
    pub fn create_plan(
        &self,
        direction: Direction,
        entry: Price,
        stop: Price,
        target: Price,
        quantity: u32,
    ) -> Result<ExitPlan> {
        let risk = entry.distance_to(stop);
        if risk.is_zero() {
            return Err(PositionError::ZeroRisk(entry.to_string()));
        }

        let level = |r: Decimal| match direction {
            Direction::Long => entry + risk * r,
            Direction::Short => entry - risk * r,
        };

        let q1 = partial_qty(quantity, self.config.partial_fraction_1);
        let q2 = partial_qty(quantity, self.config.partial_fraction_2);
        let q3 = quantity.saturating_sub(q1 + q2);

        let plan = ExitPlan {
            initial_stop: stop,
            target1: level(self.config.target1_r),
            target2: level(self.config.target2_r),
            target3: level(self.config.target3_r),
            breakeven_trigger: level(self.config.breakeven_trigger_r),
            trailing_trigger: level(self.config.trailing_trigger_r),
            trailing_offset: risk * self.config.trailing_offset_r,
            time_limit_bars: self.config.time_limit_bars,
            partial_sizes: (q1, q2, q3),
        };
        debug!(
            %direction,
            %entry,
            %stop,
            original_target = %target,
            target1 = %plan.target1,
            target3 = %plan.target3,
            "exit plan created"
        );
        Ok(plan)
    }
}

fn partial_qty(quantity: u32, fraction: Decimal) -> u32 {
    (Decimal::from(quantity) * fraction)
        .floor()
        .to_u32()
        .unwrap_or(0)
        .max(1)
}

impl ExitPlan {
    /// Human-readable plan block for the log.
    pub fn summary(&self) -> String {
        format!(
            "stop {} | T1 {} ({}x) | T2 {} ({}x) | T3 {} ({}x runner) | \
             BE at {} | trail from {} offset {} | time limit {} bars",
            self.initial_stop,
            self.target1,
            self.partial_sizes.0,
            self.target2,
            self.partial_sizes.1,
            self.target3,
            self.partial_sizes.2,
            self.breakeven_trigger,
            self.trailing_trigger,
            self.trailing_offset,
            self.time_limit_bars,
        )
    }
}
