//! Exit planning and open position management.
//!
//! [`ExitPlanner`] builds a scaled exit plan at entry time (three
//! R-multiple targets, breakeven and trailing triggers) and produces
//! per-tick exit recommendations for an open position. [`OpenPosition`]
//! owns the position's mutable state and applies accepted actions.

pub mod config;
pub mod error;
pub mod plan;
pub mod recommend;
pub mod tracker;

pub use config::ExitConfig;
pub use error::{PositionError, Result};
pub use plan::{ExitPlan, ExitPlanner};
pub use recommend::{CloseReason, ExitActions, ExitContext, PartialExit};
pub use tracker::OpenPosition;
