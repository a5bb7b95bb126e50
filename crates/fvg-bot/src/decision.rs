//! Decision sources.
//!
//! A decision source looks at the market context and may propose a
//! trade; the proposal is schema-validated here at the boundary before
//! the risk gate ever sees it. The built-in source is a zone-magnet
//! heuristic: an unfilled gap pulls price toward it, so trade in the
//! direction of the nearest zone and take profit just before it fills.
//! Richer sources (an external reasoning service) plug in behind the
//! same trait.

use fvg_core::{CoreError, Direction, Price, TradeProposal, Zone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Market context handed to a decision source.
pub struct DecisionContext<'a> {
    pub price: Price,
    /// Nearest unfilled bearish zone above the market (long target).
    pub nearest_above: Option<&'a Zone>,
    /// Nearest unfilled bullish zone below the market (short target).
    pub nearest_below: Option<&'a Zone>,
    /// Zone whose band currently contains the price, if any.
    pub inside_zone: Option<&'a Zone>,
}

/// Something that can propose a trade.
pub trait DecisionSource {
    fn propose(&self, ctx: &DecisionContext<'_>) -> Option<TradeProposal>;
}

/// Zone-magnet heuristic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Points short of the zone's fill boundary to take profit.
    #[serde(default = "default_target_buffer")]
    pub target_buffer: Price,
    /// Fixed stop distance in points.
    #[serde(default = "default_stop_distance")]
    pub stop_distance: Price,
    /// Minimum entry-to-target distance worth trading.
    #[serde(default = "default_min_reward")]
    pub min_reward: Price,
    /// Maximum entry-to-target distance; further zones are too slow a
    /// magnet to lean on.
    #[serde(default = "default_max_reward")]
    pub max_reward: Price,
    /// Confidence attached to heuristic proposals.
    #[serde(default = "default_confidence")]
    pub confidence: Decimal,
}

fn default_target_buffer() -> Price {
    Price::new(Decimal::from(5))
}

fn default_stop_distance() -> Price {
    Price::new(Decimal::from(20))
}

fn default_min_reward() -> Price {
    Price::new(Decimal::from(60))
}

fn default_max_reward() -> Price {
    Price::new(Decimal::from(150))
}

fn default_confidence() -> Decimal {
    Decimal::new(7, 1)
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            target_buffer: default_target_buffer(),
            stop_distance: default_stop_distance(),
            min_reward: default_min_reward(),
            max_reward: default_max_reward(),
            confidence: default_confidence(),
        }
    }
}

/// Built-in heuristic source.
pub struct ZoneMagnetSource {
    config: DecisionConfig,
}

impl ZoneMagnetSource {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    fn candidate(&self, price: Price, zone: &Zone) -> Option<TradeProposal> {
        let direction = zone.kind.target_direction();
        let target = match direction {
            Direction::Long => zone.fill_boundary() - self.config.target_buffer,
            Direction::Short => zone.fill_boundary() + self.config.target_buffer,
        };
        let reward = price.distance_to(target);
        if reward < self.config.min_reward || reward > self.config.max_reward {
            debug!(%zone, %reward, "zone outside reward band");
            return None;
        }
        let stop = match direction {
            Direction::Long => price - self.config.stop_distance,
            Direction::Short => price + self.config.stop_distance,
        };
        Some(TradeProposal {
            direction,
            entry: price,
            stop,
            target,
            confidence: self.config.confidence,
            reasoning: format!("magnet toward {zone}"),
        })
    }
}

impl DecisionSource for ZoneMagnetSource {
    fn propose(&self, ctx: &DecisionContext<'_>) -> Option<TradeProposal> {
        // Inside a zone the draw is ambiguous; stand aside.
        if ctx.inside_zone.is_some() {
            return None;
        }
        let long = ctx
            .nearest_above
            .and_then(|zone| self.candidate(ctx.price, zone));
        let short = ctx
            .nearest_below
            .and_then(|zone| self.candidate(ctx.price, zone));
        // The closer magnet pulls first.
        match (long, short) {
            (Some(l), Some(s)) => {
                if l.target_distance() <= s.target_distance() {
                    Some(l)
                } else {
                    Some(s)
                }
            }
            (long, short) => long.or(short),
        }
    }
}

/// Boundary validation for any decision source's output: structural
/// checks plus stop/target direction consistency. Invalid payloads are
/// dropped before the risk gate.
pub fn validate_boundary(proposal: &TradeProposal) -> Result<(), CoreError> {
    proposal.validate()?;
    let consistent = match proposal.direction {
        Direction::Long => proposal.stop < proposal.entry && proposal.target > proposal.entry,
        Direction::Short => proposal.stop > proposal.entry && proposal.target < proposal.entry,
    };
    if !consistent {
        return Err(CoreError::InvalidProposal(format!(
            "{} stop/target on wrong side of entry {}",
            proposal.direction, proposal.entry
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fvg_core::ZoneKind;
    use rust_decimal_macros::dec;

    fn zone(kind: ZoneKind, bottom: Decimal, top: Decimal) -> Zone {
        Zone::new(kind, Price::new(top), Price::new(bottom), 0, Utc::now()).unwrap()
    }

    fn source() -> ZoneMagnetSource {
        ZoneMagnetSource::new(DecisionConfig::default())
    }

    #[test]
    fn test_long_toward_bearish_zone_above() {
        // Bearish zone 14760-14770 above a 14690 market: the fill
        // boundary is the top, buffered 5 points down.
        let above = zone(ZoneKind::Bearish, dec!(14760), dec!(14770));
        let ctx = DecisionContext {
            price: Price::new(dec!(14690)),
            nearest_above: Some(&above),
            nearest_below: None,
            inside_zone: None,
        };
        let p = source().propose(&ctx).unwrap();
        assert_eq!(p.direction, Direction::Long);
        assert_eq!(p.target, Price::new(dec!(14765)));
        assert_eq!(p.stop, Price::new(dec!(14670)));
        assert!(validate_boundary(&p).is_ok());
    }

    #[test]
    fn test_short_toward_bullish_zone_below() {
        let below = zone(ZoneKind::Bullish, dec!(14590), dec!(14600));
        let ctx = DecisionContext {
            price: Price::new(dec!(14670)),
            nearest_above: None,
            nearest_below: Some(&below),
            inside_zone: None,
        };
        let p = source().propose(&ctx).unwrap();
        assert_eq!(p.direction, Direction::Short);
        // Fill boundary is the bottom, buffered 5 points up.
        assert_eq!(p.target, Price::new(dec!(14595)));
        assert_eq!(p.stop, Price::new(dec!(14690)));
    }

    #[test]
    fn test_closer_magnet_wins() {
        let above = zone(ZoneKind::Bearish, dec!(14760), dec!(14770));
        let below = zone(ZoneKind::Bullish, dec!(14580), dec!(14590));
        let ctx = DecisionContext {
            price: Price::new(dec!(14690)),
            nearest_above: Some(&above),
            nearest_below: Some(&below),
            inside_zone: None,
        };
        // Long reward 75, short reward 95: the long is closer.
        let p = source().propose(&ctx).unwrap();
        assert_eq!(p.direction, Direction::Long);
    }

    #[test]
    fn test_no_proposal_inside_zone() {
        let above = zone(ZoneKind::Bearish, dec!(14760), dec!(14770));
        let inside = zone(ZoneKind::Bullish, dec!(14680), dec!(14700));
        let ctx = DecisionContext {
            price: Price::new(dec!(14690)),
            nearest_above: Some(&above),
            nearest_below: None,
            inside_zone: Some(&inside),
        };
        assert!(source().propose(&ctx).is_none());
    }

    #[test]
    fn test_reward_band_filters_zones() {
        // Too close: 30 points to target.
        let near = zone(ZoneKind::Bearish, dec!(14715), dec!(14725));
        let ctx = DecisionContext {
            price: Price::new(dec!(14690)),
            nearest_above: Some(&near),
            nearest_below: None,
            inside_zone: None,
        };
        assert!(source().propose(&ctx).is_none());

        // Too far: 295 points to target.
        let far = zone(ZoneKind::Bearish, dec!(14980), dec!(14990));
        let ctx = DecisionContext {
            price: Price::new(dec!(14690)),
            nearest_above: Some(&far),
            nearest_below: None,
            inside_zone: None,
        };
        assert!(source().propose(&ctx).is_none());
    }

    #[test]
    fn test_boundary_rejects_wrong_side() {
        let mut p = TradeProposal {
            direction: Direction::Long,
            entry: Price::new(dec!(100)),
            stop: Price::new(dec!(90)),
            target: Price::new(dec!(160)),
            confidence: dec!(0.8),
            reasoning: String::new(),
        };
        assert!(validate_boundary(&p).is_ok());
        p.stop = Price::new(dec!(110));
        assert!(validate_boundary(&p).is_err());
    }
}
