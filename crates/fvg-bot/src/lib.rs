//! Fair value gap trading bot.
//!
//! Wires the zone engine, risk gate, and exit planner into a single
//! polling loop over a CSV bar feed, and writes accepted signals to a
//! CSV file for the execution platform.

pub mod app;
pub mod config;
pub mod decision;
pub mod error;
pub mod feed;
pub mod signals;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
