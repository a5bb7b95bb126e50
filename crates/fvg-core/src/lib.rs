//! Core domain types for the FVG trading agent.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`: precision-safe price type (points)
//! - `Bar`: a completed OHLC bar with optional indicator columns
//! - `Zone`, `ZoneKind`: a fair value gap zone and its direction
//! - `Direction`, `TradeResult`: trading enums
//! - `TradeProposal`: schema-validated candidate trade from a decision source

pub mod bar;
pub mod error;
pub mod price;
pub mod trade;
pub mod zone;

pub use bar::Bar;
pub use error::{CoreError, Result};
pub use price::Price;
pub use trade::{Direction, TradeProposal, TradeResult};
pub use zone::{Zone, ZoneId, ZoneKind};
