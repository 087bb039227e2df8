//! Writing a complete snapshot batch

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::SqliteRepo;
use rusqlite::Connection;
use studydiff_core::model::{
    AnswerSnapshot, ManagedListAssignmentSnapshot, ManagedListEntitySnapshot,
    QuestionLineSnapshot,
};
use studydiff_core_types::StudyId;

/// Snapshot rows of one study version
#[derive(Debug, Clone, Default)]
pub struct SnapshotBatch {
    pub lines: Vec<QuestionLineSnapshot>,
    pub answers: Vec<AnswerSnapshot>,
    pub assignments: Vec<ManagedListAssignmentSnapshot>,
    pub entities: Vec<ManagedListEntitySnapshot>,
}

/// Write all rows of a batch and return the new batch id
///
/// Rows are inserted parent-first. Pass a transaction to make the batch
/// atomic.
///
/// # Errors
///
/// Returns a `Persistence` error if any insert fails.
pub fn write_snapshot_batch(
    conn: &Connection,
    study_id: &StudyId,
    batch: &SnapshotBatch,
) -> Result<i64> {
    let batch_id = SqliteRepo::create_snapshot_batch(conn, study_id)?;
    for line in &batch.lines {
        SqliteRepo::insert_question_line(conn, batch_id, line)?;
    }
    for answer in &batch.answers {
        SqliteRepo::insert_answer(conn, answer)?;
    }
    for assignment in &batch.assignments {
        SqliteRepo::insert_assignment(conn, assignment)?;
    }
    for entity in &batch.entities {
        SqliteRepo::insert_entity(conn, entity)?;
    }

    tracing::debug!(
        study_id = %study_id,
        batch_id,
        line_count = batch.lines.len(),
        "wrote snapshot batch"
    );
    Ok(batch_id)
}
