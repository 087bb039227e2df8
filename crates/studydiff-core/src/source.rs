//! Storage seams consumed by the changelog engine
//!
//! The engine reads snapshots through [`SnapshotSource`] and appends rows
//! through [`ChangelogSink`]. Both are synchronous; implementations live in
//! `ops::store` (in-memory) and in the SQLite store crate.

use crate::errors::Result;
use crate::model::{
    AnswerSnapshot, ChangelogRecord, ManagedListAssignmentSnapshot, ManagedListEntitySnapshot,
    QuestionLineSnapshot, Study,
};
use studydiff_core_types::{ChangelogId, SnapshotId, StudyId};

/// Read-only access to studies and their snapshot batches
pub trait SnapshotSource {
    /// Look up a study version; `Ok(None)` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the backing store cannot be read.
    fn study(&self, study_id: &StudyId) -> Result<Option<Study>>;

    /// Question line snapshots from the latest snapshot batch of a study
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the backing store cannot be read.
    fn question_line_snapshots(&self, study_id: &StudyId) -> Result<Vec<QuestionLineSnapshot>>;

    /// Answer snapshots owned by one line snapshot
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the backing store cannot be read.
    fn answer_snapshots(&self, line_snapshot_id: &SnapshotId) -> Result<Vec<AnswerSnapshot>>;

    /// Managed list assignments owned by one line snapshot
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the backing store cannot be read.
    fn managed_list_assignments(
        &self,
        line_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListAssignmentSnapshot>>;

    /// Managed list entities owned by one assignment snapshot
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the backing store cannot be read.
    fn managed_list_entities(
        &self,
        assignment_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListEntitySnapshot>>;
}

/// Append-only changelog storage
pub trait ChangelogSink {
    /// Persist one record and return its assigned id
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the write fails. Callers must abort
    /// the enclosing unit of work.
    fn create(&mut self, record: &ChangelogRecord) -> Result<ChangelogId>;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
    fn study(&self, study_id: &StudyId) -> Result<Option<Study>> {
        (**self).study(study_id)
    }

    fn question_line_snapshots(&self, study_id: &StudyId) -> Result<Vec<QuestionLineSnapshot>> {
        (**self).question_line_snapshots(study_id)
    }

    fn answer_snapshots(&self, line_snapshot_id: &SnapshotId) -> Result<Vec<AnswerSnapshot>> {
        (**self).answer_snapshots(line_snapshot_id)
    }

    fn managed_list_assignments(
        &self,
        line_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListAssignmentSnapshot>> {
        (**self).managed_list_assignments(line_snapshot_id)
    }

    fn managed_list_entities(
        &self,
        assignment_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListEntitySnapshot>> {
        (**self).managed_list_entities(assignment_snapshot_id)
    }
}

impl<T: ChangelogSink + ?Sized> ChangelogSink for &mut T {
    fn create(&mut self, record: &ChangelogRecord) -> Result<ChangelogId> {
        (**self).create(record)
    }
}
