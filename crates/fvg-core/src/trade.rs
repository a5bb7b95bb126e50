//! Trading enums and the validated decision payload.

use crate::error::{CoreError, Result};
use crate::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// Signed P/L in points for a move from `entry` to `price`.
    pub fn pnl_points(&self, entry: Price, price: Price) -> Price {
        match self {
            Self::Long => price - entry,
            Self::Short => entry - price,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Outcome classification for a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeResult {
    Win,
    Loss,
    Breakeven,
}

impl TradeResult {
    /// Classify a signed points P/L.
    pub fn from_pnl(pnl: Price) -> Self {
        if pnl.is_positive() {
            Self::Win
        } else if pnl.is_negative() {
            Self::Loss
        } else {
            Self::Breakeven
        }
    }
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "WIN"),
            Self::Loss => write!(f, "LOSS"),
            Self::Breakeven => write!(f, "BREAKEVEN"),
        }
    }
}

/// A candidate trade from an external decision source.
///
/// Decision payloads are validated here, at the boundary, before anything
/// downstream (risk gate, exit planner) sees them. Semantic checks such as
/// "stop on the correct side of entry" belong to the risk gate, which
/// reports them as routine rejections rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub direction: Direction,
    pub entry: Price,
    pub stop: Price,
    pub target: Price,
    /// Decision confidence in [0, 1].
    pub confidence: Decimal,
    /// Free-form rationale from the decision source.
    #[serde(default)]
    pub reasoning: String,
}

impl TradeProposal {
    /// Validate structural integrity of the payload.
    pub fn validate(&self) -> Result<()> {
        if !self.entry.is_positive() {
            return Err(CoreError::InvalidProposal(format!(
                "entry must be positive, got {}",
                self.entry
            )));
        }
        if !self.stop.is_positive() {
            return Err(CoreError::InvalidProposal(format!(
                "stop must be positive, got {}",
                self.stop
            )));
        }
        if !self.target.is_positive() {
            return Err(CoreError::InvalidProposal(format!(
                "target must be positive, got {}",
                self.target
            )));
        }
        if self.confidence < Decimal::ZERO || self.confidence > Decimal::ONE {
            return Err(CoreError::InvalidProposal(format!(
                "confidence must be in [0, 1], got {}",
                self.confidence
            )));
        }
        Ok(())
    }

    /// Entry-to-stop distance in points.
    pub fn stop_distance(&self) -> Price {
        self.entry.distance_to(self.stop)
    }

    /// Entry-to-target distance in points.
    pub fn target_distance(&self) -> Price {
        self.entry.distance_to(self.target)
    }

    /// Risk/reward ratio. None when risk is zero (degenerate proposal).
    pub fn risk_reward(&self) -> Option<Decimal> {
        let risk = self.stop_distance();
        if risk.is_zero() {
            return None;
        }
        Some(self.target_distance().inner() / risk.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn proposal() -> TradeProposal {
        TradeProposal {
            direction: Direction::Long,
            entry: Price::new(dec!(100)),
            stop: Price::new(dec!(90)),
            target: Price::new(dec!(140)),
            confidence: dec!(0.8),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_valid_proposal() {
        assert!(proposal().validate().is_ok());
        assert_eq!(proposal().risk_reward().unwrap(), dec!(4));
    }

    #[test]
    fn test_zero_risk_has_no_risk_reward() {
        let mut p = proposal();
        p.stop = p.entry;
        // Structurally valid; the gate rejects it with a zero-risk reason.
        assert!(p.validate().is_ok());
        assert!(p.risk_reward().is_none());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut p = proposal();
        p.confidence = dec!(1.2);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_pnl_points() {
        let long = Direction::Long;
        let short = Direction::Short;
        assert_eq!(
            long.pnl_points(Price::new(dec!(100)), Price::new(dec!(105))),
            Price::new(dec!(5))
        );
        assert_eq!(
            short.pnl_points(Price::new(dec!(100)), Price::new(dec!(105))),
            Price::new(dec!(-5))
        );
    }
}
