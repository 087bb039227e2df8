//! StudyDiff Core - changelog diffing kernel for versioned studies
//!
//! This crate provides the pure, storage-agnostic part of the changelog
//! pipeline, including:
//! - Study and snapshot models (question lines, answers, managed list
//!   assignments and entities)
//! - Identity matching, field comparison and reorder detection
//! - The changelog emitter and the `compute_changelog` orchestrator
//! - `SnapshotSource` / `ChangelogSink` seams with in-memory implementations
//! - Structured errors and logging shared by the store and engine crates

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod source;

// Re-export commonly used types
pub use diff::{compute_changelog, render_changelog_summary, ChangelogOptions};
pub use errors::{ExError, ExErrorKind, Result, StudyDiffError};
pub use model::{ChangelogRecord, Study};
pub use ops::{MemoryChangelog, MemoryStore};
pub use source::{ChangelogSink, SnapshotSource};
