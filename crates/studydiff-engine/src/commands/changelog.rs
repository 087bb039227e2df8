//! Changelog command handlers with boundary logging.
//!
//! - `apply_study_update`: persist an updated study row and its changelog in
//!   one transaction
//! - `compute_study_changelog`: compute the changelog of an already-stored
//!   study version
//! - `list_study_changelog`: read back stored rows
//!
//! The `_with_context` variants take the caller's [`CommandContext`]; its
//! correlation ids are logged on every lifecycle event and attached to the
//! returned error.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for these commands:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! `compute_changelog` in core logs its own lifecycle nested inside.

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use studydiff_core::diff::ChangelogOptions;
use studydiff_core::errors::StudyDiffError;
use studydiff_core::model::{ChangelogRecord, StoredChangelogRecord, Study};
use studydiff_core::{compute_changelog, log_op_end, log_op_error, log_op_start};
use studydiff_core_types::StudyId;
use studydiff_store::errors::{from_rusqlite, Result};
use studydiff_store::{SqliteChangelogSink, SqliteRepo, SqliteSnapshotSource};
use tracing::field::display;

use crate::commands::context::CommandContext;

/// Persist an updated study and compute its changelog atomically
///
/// The study row is upserted, then the changelog against its parent is
/// computed and written, all inside one transaction. On any failure the
/// transaction is dropped and neither the study update nor any changelog row
/// persists. With `options.dry_run` the records are returned and the
/// transaction is rolled back.
///
/// ## Errors
///
/// - `NotFound`: the parent study does not exist
/// - `DuplicateIdentity` / `InvariantViolation`: inconsistent snapshots
/// - `Persistence` / `Decode`: database error
pub fn apply_study_update(
    conn: &mut Connection,
    study: &Study,
    options: &ChangelogOptions,
) -> Result<Vec<ChangelogRecord>> {
    apply_study_update_with_context(conn, study, options, &CommandContext::default())
}

/// [`apply_study_update`] under the caller's correlation ids
///
/// ## Errors
///
/// As [`apply_study_update`]; the error carries the context's ids.
pub fn apply_study_update_with_context(
    conn: &mut Connection,
    study: &Study,
    options: &ChangelogOptions,
    ctx: &CommandContext,
) -> Result<Vec<ChangelogRecord>> {
    log_op_start!(
        "apply_study_update",
        study_id = %study.id,
        dry_run = options.dry_run,
        request_id = ctx.request_id.map(display),
        trace_id = ctx.trace_id.map(display)
    );
    let start = std::time::Instant::now();

    let records = apply_study_update_impl(conn, study, options).map_err(|e| {
        let e = ctx.attach(e);
        log_op_error!(
            "apply_study_update",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            study_id = %study.id,
            request_id = ctx.request_id.map(display),
            trace_id = ctx.trace_id.map(display)
        );
        e
    })?;

    log_op_end!(
        "apply_study_update",
        duration_ms = start.elapsed().as_millis() as u64,
        study_id = %study.id,
        record_count = records.len(),
        request_id = ctx.request_id.map(display),
        trace_id = ctx.trace_id.map(display)
    );

    Ok(records)
}

fn apply_study_update_impl(
    conn: &mut Connection,
    study: &Study,
    options: &ChangelogOptions,
) -> Result<Vec<ChangelogRecord>> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    SqliteRepo::persist_study(&tx, study)?;
    let records = compute_changelog(
        &SqliteSnapshotSource::new(&tx),
        SqliteChangelogSink::new(&tx),
        study,
        options,
    )?;

    if options.dry_run {
        tx.rollback().map_err(from_rusqlite)?;
    } else {
        tx.commit().map_err(from_rusqlite)?;
    }
    Ok(records)
}

/// Compute and store the changelog of a study already in the database
///
/// ## Errors
///
/// - `NotFound`: the study or its parent does not exist
/// - `DuplicateIdentity` / `InvariantViolation`: inconsistent snapshots
/// - `Persistence` / `Decode`: database error
pub fn compute_study_changelog(
    conn: &mut Connection,
    study_id: &StudyId,
    options: &ChangelogOptions,
) -> Result<Vec<ChangelogRecord>> {
    compute_study_changelog_with_context(conn, study_id, options, &CommandContext::default())
}

/// [`compute_study_changelog`] under the caller's correlation ids
///
/// ## Errors
///
/// As [`compute_study_changelog`]; the error carries the context's ids.
pub fn compute_study_changelog_with_context(
    conn: &mut Connection,
    study_id: &StudyId,
    options: &ChangelogOptions,
    ctx: &CommandContext,
) -> Result<Vec<ChangelogRecord>> {
    log_op_start!(
        "compute_study_changelog",
        study_id = %study_id,
        request_id = ctx.request_id.map(display),
        trace_id = ctx.trace_id.map(display)
    );
    let start = std::time::Instant::now();

    let records = compute_study_changelog_impl(conn, study_id, options).map_err(|e| {
        let e = ctx.attach(e);
        log_op_error!(
            "compute_study_changelog",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            study_id = %study_id,
            request_id = ctx.request_id.map(display),
            trace_id = ctx.trace_id.map(display)
        );
        e
    })?;

    log_op_end!(
        "compute_study_changelog",
        duration_ms = start.elapsed().as_millis() as u64,
        study_id = %study_id,
        record_count = records.len(),
        request_id = ctx.request_id.map(display),
        trace_id = ctx.trace_id.map(display)
    );

    Ok(records)
}

fn compute_study_changelog_impl(
    conn: &mut Connection,
    study_id: &StudyId,
    options: &ChangelogOptions,
) -> Result<Vec<ChangelogRecord>> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    let study = SqliteRepo::get_study(&tx, study_id)?.ok_or_else(|| {
        StudyDiffError::StudyNotFound {
            study_id: study_id.to_string(),
        }
    })?;
    let records = compute_changelog(
        &SqliteSnapshotSource::new(&tx),
        SqliteChangelogSink::new(&tx),
        &study,
        options,
    )?;

    tx.commit().map_err(from_rusqlite)?;
    Ok(records)
}

/// Stored changelog rows of one study version, in insertion order
///
/// ## Errors
///
/// - `Persistence` / `Decode`: database error
pub fn list_study_changelog(
    conn: &Connection,
    study_id: &StudyId,
) -> Result<Vec<StoredChangelogRecord>> {
    SqliteRepo::list_changelog(conn, study_id)
}
