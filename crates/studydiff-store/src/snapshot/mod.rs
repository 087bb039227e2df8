//! Snapshot batches in SQLite.
//!
//! A study version's snapshot rows are written as one batch; readers only
//! ever see the latest batch of a study.

pub mod batch;
pub mod query;

pub use batch::{write_snapshot_batch, SnapshotBatch};
pub use query::SqliteSnapshotSource;
