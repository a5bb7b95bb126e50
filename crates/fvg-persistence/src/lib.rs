//! Risk state snapshots on disk.
//!
//! The risk gate's daily metrics survive restarts through a small JSON
//! snapshot file. Saves are atomic (write to a temp file, then rename);
//! a missing or corrupt file on load is a warning and a fresh start,
//! never a crash.

pub mod error;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use store::SnapshotStore;
