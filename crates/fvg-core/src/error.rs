//! Error types for fvg-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Zone geometry contract violation: a zone's top must be strictly
    /// above its bottom. Callers constructing zones from raw prices are
    /// expected to fail fast on this, never to swallow it.
    #[error("Invalid zone geometry: top {top} <= bottom {bottom}")]
    InvalidZoneGeometry { top: String, bottom: String },

    #[error("Invalid trade proposal: {0}")]
    InvalidProposal(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
