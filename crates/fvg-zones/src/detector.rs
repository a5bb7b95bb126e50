//! Three-bar fair value gap detection.
//!
//! A fair value gap is a three-bar imbalance: the first and third bar
//! do not overlap, leaving a band of prices the market skipped. The
//! middle bar must exist but its prices play no role.
//!
//! Detection is a pure function of the bar slice. Scanning the same
//! bars twice yields the same candidates.

use crate::config::ZoneConfig;
use fvg_core::{Bar, Zone, ZoneKind};
use tracing::debug;

/// Stateless gap scanner.
pub struct GapDetector {
    config: ZoneConfig,
}

impl GapDetector {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Candidate zone created by the bar at `index`, if any.
    ///
    /// Compares `bars[index]` against `bars[index - 2]`:
    /// - Bullish gap when `low > bars[index - 2].high`
    ///   (band `[prev_high, low]`),
    /// - Bearish gap when `high < bars[index - 2].low`
    ///   (band `[high, prev_low]`).
    ///
    /// The two conditions are mutually exclusive. Candidates smaller
    /// than `min_gap_size` are discarded.
    pub fn candidate_at(&self, bars: &[Bar], index: usize) -> Option<Zone> {
        if index < 2 || index >= bars.len() {
            return None;
        }
        let first = &bars[index - 2];
        let third = &bars[index];

        let (kind, top, bottom) = if third.low > first.high {
            (ZoneKind::Bullish, third.low, first.high)
        } else if third.high < first.low {
            (ZoneKind::Bearish, first.low, third.high)
        } else {
            return None;
        };

        if top - bottom < self.config.min_gap_size {
            return None;
        }

        // The strict comparisons above guarantee top > bottom.
        let zone = Zone::new(kind, top, bottom, index, third.time).ok()?;
        debug!(zone = %zone, index, "gap candidate");
        Some(zone)
    }

    /// Candidate created by the most recent bar, if any.
    pub fn check_latest(&self, bars: &[Bar]) -> Option<Zone> {
        if bars.len() < 3 {
            return None;
        }
        self.candidate_at(bars, bars.len() - 1)
    }

    /// All candidates in the series, oldest first.
    ///
    /// Fewer than three bars is an empty result, not an error.
    pub fn scan(&self, bars: &[Bar]) -> Vec<Zone> {
        if bars.len() < 3 {
            return Vec::new();
        }
        (2..bars.len())
            .filter_map(|i| self.candidate_at(bars, i))
            .collect()
    }

    /// Full-history scan that drops candidates already filled by a
    /// later bar. Used when seeding the registry at startup.
    pub fn scan_with_fills(&self, bars: &[Bar]) -> Vec<Zone> {
        self.scan(bars)
            .into_iter()
            .filter(|zone| !Self::filled_after(zone, bars))
            .collect()
    }

    fn filled_after(zone: &Zone, bars: &[Bar]) -> bool {
        bars.iter().skip(zone.bar_index + 1).any(|bar| match zone.kind {
            ZoneKind::Bullish => bar.low <= zone.bottom,
            ZoneKind::Bearish => bar.high >= zone.top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fvg_core::Price;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bar(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar::new(
            Price::new(open),
            Price::new(high),
            Price::new(low),
            Price::new(close),
            Utc::now(),
        )
    }

    fn detector() -> GapDetector {
        GapDetector::new(ZoneConfig::default())
    }

    #[test]
    fn test_bullish_gap_detected() {
        // First bar tops at 100, third bar's low is 110: an 8-plus
        // point band the market never traded.
        let bars = vec![
            bar(dec!(95), dec!(100), dec!(93), dec!(99)),
            bar(dec!(99), dec!(107), dec!(98), dec!(106)),
            bar(dec!(111), dec!(118), dec!(110), dec!(117)),
        ];
        let zones = detector().scan(&bars);
        assert_eq!(zones.len(), 1);
        let z = &zones[0];
        assert_eq!(z.kind, ZoneKind::Bullish);
        assert_eq!(z.top, Price::new(dec!(110)));
        assert_eq!(z.bottom, Price::new(dec!(100)));
        assert_eq!(z.gap_size, Price::new(dec!(10)));
    }

    #[test]
    fn test_bearish_gap_detected() {
        let bars = vec![
            bar(dec!(120), dec!(125), dec!(118), dec!(119)),
            bar(dec!(118), dec!(119), dec!(112), dec!(113)),
            bar(dec!(109), dec!(110), dec!(104), dec!(105)),
        ];
        let zones = detector().scan(&bars);
        assert_eq!(zones.len(), 1);
        let z = &zones[0];
        assert_eq!(z.kind, ZoneKind::Bearish);
        assert_eq!(z.top, Price::new(dec!(118)));
        assert_eq!(z.bottom, Price::new(dec!(110)));
    }

    #[test]
    fn test_small_gap_discarded() {
        // Three-point band, below the default five-point minimum.
        let bars = vec![
            bar(dec!(95), dec!(100), dec!(93), dec!(99)),
            bar(dec!(100), dec!(102), dec!(99), dec!(101)),
            bar(dec!(104), dec!(108), dec!(103), dec!(107)),
        ];
        assert!(detector().scan(&bars).is_empty());
    }

    #[test]
    fn test_overlapping_bars_no_gap() {
        let bars = vec![
            bar(dec!(95), dec!(105), dec!(93), dec!(99)),
            bar(dec!(99), dec!(107), dec!(98), dec!(106)),
            bar(dec!(104), dec!(112), dec!(103), dec!(111)),
        ];
        assert!(detector().scan(&bars).is_empty());
    }

    #[test]
    fn test_short_series_is_empty_not_error() {
        assert!(detector().scan(&[]).is_empty());
        let bars = vec![
            bar(dec!(95), dec!(100), dec!(93), dec!(99)),
            bar(dec!(111), dec!(118), dec!(110), dec!(117)),
        ];
        assert!(detector().scan(&bars).is_empty());
        assert!(detector().check_latest(&bars).is_none());
    }

    #[test]
    fn test_scan_idempotent() {
        let bars = vec![
            bar(dec!(95), dec!(100), dec!(93), dec!(99)),
            bar(dec!(99), dec!(107), dec!(98), dec!(106)),
            bar(dec!(111), dec!(118), dec!(110), dec!(117)),
            bar(dec!(117), dec!(122), dec!(116), dec!(121)),
        ];
        let d = detector();
        let a = d.scan(&bars);
        let b = d.scan(&bars);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!((x.kind, x.top, x.bottom), (y.kind, y.top, y.bottom));
        }
    }

    #[test]
    fn test_scan_with_fills_drops_filled_zones() {
        // Bullish gap 100-110, then a later bar trades down through
        // 100, filling it.
        let bars = vec![
            bar(dec!(95), dec!(100), dec!(93), dec!(99)),
            bar(dec!(99), dec!(107), dec!(98), dec!(106)),
            bar(dec!(111), dec!(118), dec!(110), dec!(117)),
            bar(dec!(117), dec!(117), dec!(99), dec!(101)),
        ];
        assert!(detector().scan_with_fills(&bars).is_empty());
        assert_eq!(detector().scan(&bars).len(), 1);
    }
}
