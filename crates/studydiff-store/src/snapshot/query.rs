//! Read-only snapshot queries.
//!
//! [`SqliteSnapshotSource`] serves the changelog engine from the latest
//! snapshot batch of each study.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::SqliteRepo;
use rusqlite::Connection;
use studydiff_core::model::{
    AnswerSnapshot, ManagedListAssignmentSnapshot, ManagedListEntitySnapshot,
    QuestionLineSnapshot, Study,
};
use studydiff_core::SnapshotSource;
use studydiff_core_types::{SnapshotId, StudyId};

/// Snapshot reader over a connection or transaction
pub struct SqliteSnapshotSource<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSnapshotSource<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotSource for SqliteSnapshotSource<'_> {
    fn study(&self, study_id: &StudyId) -> Result<Option<Study>> {
        SqliteRepo::get_study(self.conn, study_id)
    }

    fn question_line_snapshots(&self, study_id: &StudyId) -> Result<Vec<QuestionLineSnapshot>> {
        match SqliteRepo::latest_snapshot_batch(self.conn, study_id)? {
            Some(batch_id) => SqliteRepo::list_question_lines(self.conn, batch_id),
            None => Ok(Vec::new()),
        }
    }

    fn answer_snapshots(&self, line_snapshot_id: &SnapshotId) -> Result<Vec<AnswerSnapshot>> {
        SqliteRepo::list_answers(self.conn, line_snapshot_id)
    }

    fn managed_list_assignments(
        &self,
        line_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListAssignmentSnapshot>> {
        SqliteRepo::list_assignments(self.conn, line_snapshot_id)
    }

    fn managed_list_entities(
        &self,
        assignment_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListEntitySnapshot>> {
        SqliteRepo::list_entities(self.conn, assignment_snapshot_id)
    }
}
