//! Pre-trade risk gate and daily risk state machine.
//!
//! [`RiskGate`] is the single chokepoint between a trade proposal and a
//! signal: every proposal passes the full check list or is blocked with
//! a reason. It also owns the daily risk metrics, the
//! Normal/Cooldown/Halted state machine, and position-size throttling.
//!
//! The gate prioritizes stopping over trading when in doubt.

pub mod config;
pub mod gate;
pub mod state;

pub use config::RiskLimits;
pub use gate::{GateVerdict, RiskGate};
pub use state::{RiskMetrics, RiskMode, RiskSnapshot};
