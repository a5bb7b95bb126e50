//! Completed OHLC bar.

use crate::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed OHLC bar from the historical feed.
///
/// The feed may carry indicator columns (EMA 21/75) alongside the raw
/// prices; they are optional because not every data source computes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    /// Bar close timestamp.
    pub time: DateTime<Utc>,
    /// 21-period EMA at this bar, if the feed provides it.
    #[serde(default)]
    pub ema21: Option<Price>,
    /// 75-period EMA at this bar, if the feed provides it.
    #[serde(default)]
    pub ema75: Option<Price>,
}

impl Bar {
    /// Create a bar without indicator columns.
    pub fn new(open: Price, high: Price, low: Price, close: Price, time: DateTime<Utc>) -> Self {
        Self {
            open,
            high,
            low,
            close,
            time,
            ema21: None,
            ema75: None,
        }
    }

    /// High-to-low range in points.
    #[inline]
    pub fn range(&self) -> Price {
        self.high - self.low
    }

    /// Absolute open-to-close body in points.
    #[inline]
    pub fn body(&self) -> Price {
        self.close.distance_to(self.open)
    }

    /// Body as a fraction of range. None when the bar has zero range.
    pub fn body_ratio(&self) -> Option<Decimal> {
        let range = self.range();
        if range.is_zero() {
            return None;
        }
        Some(self.body().inner() / range.inner())
    }

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
