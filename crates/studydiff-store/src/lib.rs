//! StudyDiff Store - SQLite persistence for studies, snapshots and the changelog
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - Repository functions for studies, snapshot batches and changelog rows
//! - [`SqliteSnapshotSource`] and [`SqliteChangelogSink`], the storage seams
//!   the changelog engine runs against

pub mod changelog;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod snapshot;

// Re-export key types
pub use changelog::SqliteChangelogSink;
pub use errors::Result;
pub use repo::SqliteRepo;
pub use snapshot::{write_snapshot_batch, SnapshotBatch, SqliteSnapshotSource};
