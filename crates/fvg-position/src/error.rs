//! Error types for fvg-position.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    /// A plan cannot be built when the stop sits on the entry; there
    /// is no risk unit to scale targets from.
    #[error("Zero risk: stop equals entry at {0}")]
    ZeroRisk(String),
}

pub type Result<T> = std::result::Result<T, PositionError>;
