//! Fair value gap zone record.
//!
//! A zone is the persisted trace of a detected three-bar price imbalance.
//! It is created once, optionally marked filled, and never otherwise
//! mutated. A Bullish zone (gap up) leaves empty space below the market
//! and acts as a short target; a Bearish zone (gap down) leaves space
//! above and acts as a long target.

use crate::error::{CoreError, Result};
use crate::{Direction, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique zone identifier.
pub type ZoneId = Uuid;

/// Gap direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Gap up: third bar's low above first bar's high. Short target.
    Bullish,
    /// Gap down: third bar's high below first bar's low. Long target.
    Bearish,
}

impl ZoneKind {
    /// The trade direction this zone is a target for.
    pub fn target_direction(&self) -> Direction {
        match self {
            // Price is drawn down to fill a bullish gap.
            Self::Bullish => Direction::Short,
            // Price is drawn up to fill a bearish gap.
            Self::Bearish => Direction::Long,
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

/// A detected fair value gap zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub kind: ZoneKind,
    /// Upper boundary. Invariant: `top > bottom`.
    pub top: Price,
    /// Lower boundary.
    pub bottom: Price,
    /// `top - bottom`, cached at construction.
    pub gap_size: Price,
    /// Index of the third (creating) bar in the series it was detected in.
    pub bar_index: usize,
    /// Timestamp of the creating bar.
    pub created_at: DateTime<Utc>,
    pub filled: bool,
}

impl Zone {
    /// Construct a zone, enforcing the geometry invariant.
    ///
    /// Returns `CoreError::InvalidZoneGeometry` when `top <= bottom`;
    /// callers must treat that as a contract violation, not a routine
    /// outcome.
    pub fn new(
        kind: ZoneKind,
        top: Price,
        bottom: Price,
        bar_index: usize,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if top <= bottom {
            return Err(CoreError::InvalidZoneGeometry {
                top: top.to_string(),
                bottom: bottom.to_string(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            top,
            bottom,
            gap_size: top - bottom,
            bar_index,
            created_at,
            filled: false,
        })
    }

    /// Whether this zone's band overlaps another's.
    ///
    /// Touching edges (`a.bottom == b.top`) do not overlap.
    pub fn overlaps(&self, other: &Zone) -> bool {
        !(self.bottom >= other.top || other.bottom >= self.top)
    }

    /// Whether a price sits inside the band (inclusive).
    pub fn contains(&self, price: Price) -> bool {
        self.bottom <= price && price <= self.top
    }

    /// The boundary price reaches first when approaching this zone:
    /// `top` for a bullish zone (approached from above), `bottom` for a
    /// bearish zone (approached from below).
    pub fn entry_edge(&self) -> Price {
        match self.kind {
            ZoneKind::Bullish => self.top,
            ZoneKind::Bearish => self.bottom,
        }
    }

    /// The far boundary whose touch fills the zone: `bottom` for bullish,
    /// `top` for bearish.
    pub fn fill_boundary(&self) -> Price {
        match self.kind {
            ZoneKind::Bullish => self.bottom,
            ZoneKind::Bearish => self.top,
        }
    }

    /// Age of this zone in bars, relative to the given bar index.
    pub fn age_bars(&self, current_index: usize) -> usize {
        current_index.saturating_sub(self.bar_index)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} zone {}-{} ({}pts)",
            self.kind, self.bottom, self.top, self.gap_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn zone(kind: ZoneKind, bottom: rust_decimal::Decimal, top: rust_decimal::Decimal) -> Zone {
        Zone::new(kind, Price::new(top), Price::new(bottom), 0, Utc::now()).unwrap()
    }

    #[test]
    fn test_geometry_invariant_enforced() {
        let err = Zone::new(
            ZoneKind::Bullish,
            Price::new(dec!(100)),
            Price::new(dec!(110)),
            0,
            Utc::now(),
        );
        assert!(matches!(err, Err(CoreError::InvalidZoneGeometry { .. })));

        // Degenerate band (top == bottom) is also rejected.
        let err = Zone::new(
            ZoneKind::Bearish,
            Price::new(dec!(100)),
            Price::new(dec!(100)),
            0,
            Utc::now(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_gap_size_cached() {
        let z = zone(ZoneKind::Bullish, dec!(100), dec!(110));
        assert_eq!(z.gap_size, Price::new(dec!(10)));
        assert!(!z.filled);
    }

    #[test]
    fn test_overlap() {
        let a = zone(ZoneKind::Bullish, dec!(100), dec!(110));
        let b = zone(ZoneKind::Bullish, dec!(105), dec!(115));
        let c = zone(ZoneKind::Bullish, dec!(110), dec!(120)); // touching edge
        let d = zone(ZoneKind::Bullish, dec!(120), dec!(130));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_edges_by_kind() {
        let bull = zone(ZoneKind::Bullish, dec!(100), dec!(110));
        assert_eq!(bull.entry_edge(), Price::new(dec!(110)));
        assert_eq!(bull.fill_boundary(), Price::new(dec!(100)));
        assert_eq!(bull.kind.target_direction(), Direction::Short);

        let bear = zone(ZoneKind::Bearish, dec!(200), dec!(212));
        assert_eq!(bear.entry_edge(), Price::new(dec!(200)));
        assert_eq!(bear.fill_boundary(), Price::new(dec!(212)));
        assert_eq!(bear.kind.target_direction(), Direction::Long);
    }

    #[test]
    fn test_contains() {
        let z = zone(ZoneKind::Bearish, dec!(100), dec!(110));
        assert!(z.contains(Price::new(dec!(100))));
        assert!(z.contains(Price::new(dec!(105))));
        assert!(z.contains(Price::new(dec!(110))));
        assert!(!z.contains(Price::new(dec!(99.99))));
    }
}
