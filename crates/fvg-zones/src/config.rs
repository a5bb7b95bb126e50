//! Zone engine configuration.

use fvg_core::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for gap detection and the startup history scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Minimum gap size in points. Smaller imbalances are noise.
    #[serde(default = "default_min_gap_size")]
    pub min_gap_size: Price,

    /// Maximum zone age in bars for the startup history scan. Zones
    /// older than this are not admitted when seeding from history; the
    /// live path never evicts by age.
    #[serde(default = "default_max_gap_age_bars")]
    pub max_gap_age_bars: usize,
}

fn default_min_gap_size() -> Price {
    Price::new(Decimal::from(5))
}

fn default_max_gap_age_bars() -> usize {
    1000
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            min_gap_size: default_min_gap_size(),
            max_gap_age_bars: default_max_gap_age_bars(),
        }
    }
}
