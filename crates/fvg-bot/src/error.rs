//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] fvg_core::CoreError),

    #[error(transparent)]
    Position(#[from] fvg_position::PositionError),

    #[error(transparent)]
    Persistence(#[from] fvg_persistence::PersistenceError),
}

pub type AppResult<T> = Result<T, AppError>;
