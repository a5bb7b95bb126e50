//! Active zone set with dedup, fill sweeps, and nearest-zone queries.

use crate::config::ZoneConfig;
use crate::detector::GapDetector;
use fvg_core::{Bar, Price, Zone, ZoneKind};
use tracing::{debug, info};

/// Result of offering a candidate zone to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Candidate admitted, displacing `displaced` wider zones.
    Admitted { displaced: usize },
    /// An overlapping zone with an equal or smaller gap already exists.
    Rejected,
}

impl InsertOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

/// Owner of all active (unfilled) zones.
///
/// Invariants: every stored zone is unfilled (filled zones are purged
/// in the same call that marks them), and no two same-kind zones
/// overlap.
#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate zone. Smaller gap wins: overlapping same-kind
    /// zones wider than the candidate are displaced; the first
    /// overlapping zone with an equal or smaller gap rejects the
    /// candidate outright, and nothing is removed in that case.
    pub fn insert(&mut self, candidate: Zone) -> InsertOutcome {
        let mut displaced = Vec::new();
        for (i, existing) in self.zones.iter().enumerate() {
            if existing.kind != candidate.kind || !existing.overlaps(&candidate) {
                continue;
            }
            if existing.gap_size > candidate.gap_size {
                displaced.push(i);
            } else {
                debug!(candidate = %candidate, existing = %existing, "candidate rejected by tighter zone");
                return InsertOutcome::Rejected;
            }
        }
        for &i in displaced.iter().rev() {
            info!(removed = %self.zones[i], replacement = %candidate, "displacing wider zone");
            self.zones.swap_remove(i);
        }
        let count = displaced.len();
        info!(zone = %candidate, displaced = count, "zone admitted");
        self.zones.push(candidate);
        InsertOutcome::Admitted { displaced: count }
    }

    /// Completed-bar fill sweep. A bullish zone fills when the bar
    /// trades down through its bottom, a bearish zone when the bar
    /// trades up through its top. Returns the filled zones, already
    /// purged from the active set.
    pub fn apply_bar(&mut self, bar: &Bar) -> Vec<Zone> {
        self.sweep(|zone| match zone.kind {
            ZoneKind::Bullish => bar.low <= zone.bottom,
            ZoneKind::Bearish => bar.high >= zone.top,
        })
    }

    /// Intrabar tick fill sweep against a single traded price.
    pub fn apply_price(&mut self, price: Price) -> Vec<Zone> {
        self.sweep(|zone| match zone.kind {
            ZoneKind::Bullish => price <= zone.bottom,
            ZoneKind::Bearish => price >= zone.top,
        })
    }

    fn sweep(&mut self, is_filled: impl Fn(&Zone) -> bool) -> Vec<Zone> {
        let mut filled = Vec::new();
        let mut i = 0;
        while i < self.zones.len() {
            if is_filled(&self.zones[i]) {
                let mut zone = self.zones.swap_remove(i);
                zone.filled = true;
                info!(zone = %zone, "zone filled");
                filled.push(zone);
            } else {
                i += 1;
            }
        }
        filled
    }

    /// Seed from a historical bar series: scan, drop already-filled
    /// candidates, drop candidates older than `max_gap_age_bars`
    /// relative to the last bar, and offer the rest through the dedup
    /// path. Returns the number admitted.
    ///
    /// The age filter applies only here. Once a zone is live it stays
    /// until filled, however old it gets.
    pub fn seed_from_history(&mut self, detector: &GapDetector, bars: &[Bar]) -> usize {
        if bars.is_empty() {
            return 0;
        }
        let last_index = bars.len() - 1;
        let max_age = detector.config().max_gap_age_bars;
        let mut admitted = 0;
        for zone in detector.scan_with_fills(bars) {
            if zone.age_bars(last_index) > max_age {
                debug!(zone = %zone, age = zone.age_bars(last_index), "stale candidate skipped");
                continue;
            }
            if self.insert(zone).is_admitted() {
                admitted += 1;
            }
        }
        info!(admitted, total = self.zones.len(), "registry seeded from history");
        admitted
    }

    /// Active zones of one kind.
    pub fn active_zones(&self, kind: ZoneKind) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |z| z.kind == kind)
    }

    /// All active zones, in no meaningful order.
    pub fn all_active(&self) -> &[Zone] {
        &self.zones
    }

    /// (bullish, bearish) active counts.
    pub fn zone_counts(&self) -> (usize, usize) {
        let bullish = self.active_zones(ZoneKind::Bullish).count();
        (bullish, self.zones.len() - bullish)
    }

    /// Nearest bullish zone strictly below the price (its top under
    /// the market), by distance to the top. A short target.
    pub fn nearest_below(&self, price: Price) -> Option<&Zone> {
        self.active_zones(ZoneKind::Bullish)
            .filter(|z| z.top < price)
            .min_by_key(|z| price - z.top)
    }

    /// Nearest bearish zone strictly above the price (its bottom over
    /// the market), by distance to the bottom. A long target.
    pub fn nearest_above(&self, price: Price) -> Option<&Zone> {
        self.active_zones(ZoneKind::Bearish)
            .filter(|z| z.bottom > price)
            .min_by_key(|z| z.bottom - price)
    }

    /// The active zone whose band contains the price, if any.
    pub fn zone_containing(&self, price: Price) -> Option<&Zone> {
        self.zones.iter().find(|z| z.contains(price))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
