//! Fair value gap detection and zone lifecycle tracking.
//!
//! [`GapDetector`] finds three-bar price imbalances in a bar series;
//! [`ZoneRegistry`] owns the resulting zones, deduplicates overlapping
//! ones, sweeps fills on each bar or tick, and answers nearest-zone
//! queries for the decision layer.

pub mod config;
pub mod detector;
pub mod registry;

pub use config::ZoneConfig;
pub use detector::GapDetector;
pub use registry::{InsertOutcome, ZoneRegistry};
