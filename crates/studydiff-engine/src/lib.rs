//! StudyDiff Engine - Orchestration layer
//!
//! Runs the changelog computation against the SQLite store inside a single
//! transaction per study update.

pub mod commands;

pub use commands::changelog::{
    apply_study_update, apply_study_update_with_context, compute_study_changelog,
    compute_study_changelog_with_context, list_study_changelog,
};
pub use commands::context::CommandContext;
pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
