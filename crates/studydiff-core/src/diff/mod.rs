//! Study changelog diff engine.
//!
//! Compares the latest snapshot batch of a study version with that of its
//! parent and produces normalised changelog rows.
//!
//! ## Entry point
//!
//! ```ignore
//! use studydiff_core::diff::{compute_changelog, ChangelogOptions};
//!
//! let records = compute_changelog(&store, &mut changelog, &study, &ChangelogOptions::default())?;
//! let summary = studydiff_core::diff::render_changelog_summary(&records);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: the same snapshot contents produce the same rows in the
//!   same order, regardless of the order the source returns them in.
//! - **Identity matching**: records pair by domain identity, never by
//!   snapshot identity.
//! - **No unchanged markers**: identical versions produce zero rows.

pub mod emitter;
pub mod engine;
pub mod fact;
pub mod fields;
pub mod human_summary;
pub mod matcher;
pub mod options;
pub mod ordering;

pub use emitter::ChangelogEmitter;
pub use engine::{compute_changelog, detect_changes};
pub use fact::{Change, DiffFact, Subject};
pub use fields::{compare_fields, Diffable, FieldDiff};
pub use human_summary::render_changelog_summary;
pub use matcher::{match_by_identity, MatchedPair};
pub use options::ChangelogOptions;
pub use ordering::{CollapseSwaps, MinimalMoves, ReorderStrategy, ReorderStrategyKind};
