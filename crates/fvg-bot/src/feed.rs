//! CSV bar and price feeds.
//!
//! The execution platform exports two files: a completed-bar history
//! that grows a row per bar, and a live tick file whose last row holds
//! the current price. Both are polled; a read failure is logged by the
//! caller and skipped, never fatal.

use crate::error::AppResult;
use chrono::{DateTime, NaiveDateTime, Utc};
use fvg_core::{Bar, Price};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::debug;

/// One row of the completed-bar file.
#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(rename = "DateTime")]
    datetime: String,
    #[serde(rename = "Open")]
    open: Price,
    #[serde(rename = "High")]
    high: Price,
    #[serde(rename = "Low")]
    low: Price,
    #[serde(rename = "Close")]
    close: Price,
    #[serde(rename = "EMA21", default)]
    ema21: Option<Price>,
    #[serde(rename = "EMA75", default)]
    ema75: Option<Price>,
}

/// One row of the live tick file. Only the last row matters.
#[derive(Debug, Deserialize)]
struct TickRecord {
    #[serde(rename = "Last")]
    last: Price,
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    // The feed writes local-naive timestamps without a zone marker.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Completed-bar feed with change detection.
///
/// The file is re-read only when its mtime moves; a genuinely new bar
/// is recognized by a later last-row timestamp, so touching the file
/// without appending does not re-trigger bar processing.
pub struct BarFeed {
    path: PathBuf,
    last_mtime: Option<SystemTime>,
    last_bar_time: Option<DateTime<Utc>>,
}

impl BarFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_mtime: None,
            last_bar_time: None,
        }
    }

    /// Whether the file changed since the last poll. Missing file is
    /// simply "no change".
    pub fn changed(&mut self) -> bool {
        let Ok(meta) = std::fs::metadata(&self.path) else {
            return false;
        };
        let Ok(mtime) = meta.modified() else {
            return false;
        };
        match self.last_mtime {
            None => {
                self.last_mtime = Some(mtime);
                true
            }
            Some(prev) if mtime > prev => {
                self.last_mtime = Some(mtime);
                true
            }
            Some(_) => false,
        }
    }

    /// Read the full bar series, oldest first. Rows with unparseable
    /// timestamps are dropped.
    pub fn read_bars(&self) -> AppResult<Vec<Bar>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut bars = Vec::new();
        for record in reader.deserialize() {
            let record: BarRecord = record?;
            let Some(time) = parse_time(&record.datetime) else {
                debug!(raw = %record.datetime, "skipping bar with bad timestamp");
                continue;
            };
            let mut bar = Bar::new(record.open, record.high, record.low, record.close, time);
            bar.ema21 = record.ema21;
            bar.ema75 = record.ema75;
            bars.push(bar);
        }
        bars.sort_by_key(|bar| bar.time);
        Ok(bars)
    }

    /// Index of the first bar not yet seen (`bars.len()` when nothing
    /// is new); marks the whole series as seen. Several bars can land
    /// between polls, so the caller walks every index from here.
    pub fn take_new(&mut self, bars: &[Bar]) -> usize {
        let first_unseen = match self.last_bar_time {
            None => 0,
            Some(seen) => bars.partition_point(|bar| bar.time <= seen),
        };
        if let Some(last) = bars.last() {
            let seen = self.last_bar_time.map_or(last.time, |t| t.max(last.time));
            self.last_bar_time = Some(seen);
        }
        first_unseen
    }
}

/// Live tick feed: current price from the last row.
pub struct PriceFeed {
    path: PathBuf,
}

impl PriceFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Last traded price, if the file exists and has rows.
    pub fn read_last(&self) -> AppResult<Option<Price>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut last = None;
        for record in reader.deserialize() {
            let record: TickRecord = record?;
            last = Some(record.last);
        }
        Ok(last)
    }
}
