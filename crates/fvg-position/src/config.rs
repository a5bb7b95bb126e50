//! Exit plan configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// R-multiples and fractions for the scaled exit plan.
///
/// Defaults: partials at 1R and 2R (33% each), runner target at 3.5R,
/// breakeven at 1.5R, trailing from 2R at a 0.5R offset, 20-bar time
/// limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    #[serde(default = "default_target1_r")]
    pub target1_r: Decimal,
    #[serde(default = "default_target2_r")]
    pub target2_r: Decimal,
    #[serde(default = "default_target3_r")]
    pub target3_r: Decimal,
    #[serde(default = "default_breakeven_trigger_r")]
    pub breakeven_trigger_r: Decimal,
    #[serde(default = "default_trailing_trigger_r")]
    pub trailing_trigger_r: Decimal,
    #[serde(default = "default_trailing_offset_r")]
    pub trailing_offset_r: Decimal,
    /// Fraction of the position closed at target 1.
    #[serde(default = "default_partial_fraction")]
    pub partial_fraction_1: Decimal,
    /// Fraction of the position closed at target 2.
    #[serde(default = "default_partial_fraction")]
    pub partial_fraction_2: Decimal,
    /// Maximum bars to hold before the time exit applies.
    #[serde(default = "default_time_limit_bars")]
    pub time_limit_bars: u32,
}

fn default_target1_r() -> Decimal {
    Decimal::ONE
}

fn default_target2_r() -> Decimal {
    Decimal::from(2)
}

fn default_target3_r() -> Decimal {
    Decimal::new(35, 1)
}

fn default_breakeven_trigger_r() -> Decimal {
    Decimal::new(15, 1)
}

fn default_trailing_trigger_r() -> Decimal {
    Decimal::from(2)
}

fn default_trailing_offset_r() -> Decimal {
    Decimal::new(5, 1)
}

fn default_partial_fraction() -> Decimal {
    Decimal::new(33, 2)
}

fn default_time_limit_bars() -> u32 {
    20
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            target1_r: default_target1_r(),
            target2_r: default_target2_r(),
            target3_r: default_target3_r(),
            breakeven_trigger_r: default_breakeven_trigger_r(),
            trailing_trigger_r: default_trailing_trigger_r(),
            trailing_offset_r: default_trailing_offset_r(),
            partial_fraction_1: default_partial_fraction(),
            partial_fraction_2: default_partial_fraction(),
            time_limit_bars: default_time_limit_bars(),
        }
    }
}
