//! Engine-level commands that need database I/O.

#![allow(clippy::result_large_err)]

use crate::commands::changelog::{apply_study_update, compute_study_changelog};
use rusqlite::Connection;
use studydiff_core::diff::ChangelogOptions;
use studydiff_core::model::{ChangelogRecord, Study};
use studydiff_core_types::StudyId;
use studydiff_store::errors::Result;

/// Engine-level commands that require I/O (database).
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// A study version was updated; persist it and compute its changelog.
    StudyUpdated {
        study: Study,
        options: ChangelogOptions,
    },
    /// Recompute the changelog of a stored study version.
    ComputeChangelog {
        study_id: StudyId,
        options: ChangelogOptions,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    /// Records produced for the study (written unless dry run).
    Changelog(Vec<ChangelogRecord>),
}

/// Apply an engine command.
///
/// # Errors
///
/// Propagates the error of the dispatched command unchanged.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &mut Connection,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::StudyUpdated { study, options } => {
            apply_study_update(conn, &study, &options).map(EngineCommandResult::Changelog)
        }
        EngineCommand::ComputeChangelog { study_id, options } => {
            compute_study_changelog(conn, &study_id, &options).map(EngineCommandResult::Changelog)
        }
    }
}
