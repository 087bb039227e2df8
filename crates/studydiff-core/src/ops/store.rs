use std::collections::HashMap;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{
    AnswerSnapshot, ChangelogRecord, ManagedListAssignmentSnapshot, ManagedListEntitySnapshot,
    QuestionLineSnapshot, StoredChangelogRecord, Study,
};
use crate::source::{ChangelogSink, SnapshotSource};
use studydiff_core_types::{ChangelogId, SnapshotId, StudyId};

/// In-memory snapshot store
///
/// Holds one snapshot batch per study (the latest). Not thread-safe; designed
/// for single-threaded use and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    studies: HashMap<StudyId, Study>,
    lines: HashMap<StudyId, Vec<QuestionLineSnapshot>>,
    answers: HashMap<SnapshotId, Vec<AnswerSnapshot>>,
    assignments: HashMap<SnapshotId, Vec<ManagedListAssignmentSnapshot>>,
    entities: HashMap<SnapshotId, Vec<ManagedListEntitySnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a study version
    pub fn put_study(&mut self, study: Study) {
        self.studies.insert(study.id, study);
    }

    pub fn insert_line(&mut self, line: QuestionLineSnapshot) {
        self.lines.entry(line.study_id).or_default().push(line);
    }

    pub fn insert_answer(&mut self, answer: AnswerSnapshot) {
        self.answers
            .entry(answer.line_snapshot_id)
            .or_default()
            .push(answer);
    }

    pub fn insert_assignment(&mut self, assignment: ManagedListAssignmentSnapshot) {
        self.assignments
            .entry(assignment.line_snapshot_id)
            .or_default()
            .push(assignment);
    }

    pub fn insert_entity(&mut self, entity: ManagedListEntitySnapshot) {
        self.entities
            .entry(entity.assignment_snapshot_id)
            .or_default()
            .push(entity);
    }

    /// Copy the whole snapshot batch of one study version into another.
    ///
    /// Every copied record gets a fresh snapshot id and keeps its domain id,
    /// the way a new study version starts out. Returns the new line snapshots.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `to` is not a stored study.
    pub fn copy_snapshots(&mut self, from: &StudyId, to: &StudyId) -> Result<Vec<QuestionLineSnapshot>> {
        if !self.studies.contains_key(to) {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("copy_snapshots")
                .with_study_id(to)
                .with_message("target study is not stored"));
        }

        let source_lines = self.lines.get(from).cloned().unwrap_or_default();
        let mut copied = Vec::with_capacity(source_lines.len());
        for line in &source_lines {
            let new_line = line.copy_to(*to);
            let answers = self.answers.get(&line.snapshot_id).cloned().unwrap_or_default();
            for answer in answers {
                self.insert_answer(answer.copy_to(new_line.snapshot_id));
            }
            let assignments = self
                .assignments
                .get(&line.snapshot_id)
                .cloned()
                .unwrap_or_default();
            for assignment in assignments {
                let new_assignment = assignment.copy_to(new_line.snapshot_id);
                let entities = self
                    .entities
                    .get(&assignment.snapshot_id)
                    .cloned()
                    .unwrap_or_default();
                for entity in entities {
                    self.insert_entity(entity.copy_to(new_assignment.snapshot_id));
                }
                self.insert_assignment(new_assignment);
            }
            copied.push(new_line.clone());
            self.insert_line(new_line);
        }
        Ok(copied)
    }

    /// Mutable access to a stored line snapshot, for editing a new version
    pub fn line_mut(&mut self, line_snapshot_id: &SnapshotId) -> Option<&mut QuestionLineSnapshot> {
        self.lines
            .values_mut()
            .flatten()
            .find(|l| l.snapshot_id == *line_snapshot_id)
    }

    /// Mutable access to the answers of one line snapshot
    pub fn answers_mut(&mut self, line_snapshot_id: &SnapshotId) -> Option<&mut Vec<AnswerSnapshot>> {
        self.answers.get_mut(line_snapshot_id)
    }

    /// Mutable access to the managed list assignments of one line snapshot
    pub fn assignments_mut(
        &mut self,
        line_snapshot_id: &SnapshotId,
    ) -> Option<&mut Vec<ManagedListAssignmentSnapshot>> {
        self.assignments.get_mut(line_snapshot_id)
    }

    /// Mutable access to the entities of one assignment snapshot
    pub fn entities_mut(
        &mut self,
        assignment_snapshot_id: &SnapshotId,
    ) -> Option<&mut Vec<ManagedListEntitySnapshot>> {
        self.entities.get_mut(assignment_snapshot_id)
    }

    /// Remove a line snapshot (and nothing else) from its study
    pub fn remove_line(&mut self, line_snapshot_id: &SnapshotId) {
        for lines in self.lines.values_mut() {
            lines.retain(|l| l.snapshot_id != *line_snapshot_id);
        }
    }
}

impl SnapshotSource for MemoryStore {
    fn study(&self, study_id: &StudyId) -> Result<Option<Study>> {
        Ok(self.studies.get(study_id).cloned())
    }

    fn question_line_snapshots(&self, study_id: &StudyId) -> Result<Vec<QuestionLineSnapshot>> {
        Ok(self.lines.get(study_id).cloned().unwrap_or_default())
    }

    fn answer_snapshots(&self, line_snapshot_id: &SnapshotId) -> Result<Vec<AnswerSnapshot>> {
        Ok(self.answers.get(line_snapshot_id).cloned().unwrap_or_default())
    }

    fn managed_list_assignments(
        &self,
        line_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListAssignmentSnapshot>> {
        Ok(self
            .assignments
            .get(line_snapshot_id)
            .cloned()
            .unwrap_or_default())
    }

    fn managed_list_entities(
        &self,
        assignment_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListEntitySnapshot>> {
        Ok(self
            .entities
            .get(assignment_snapshot_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory append-only changelog
#[derive(Debug, Clone, Default)]
pub struct MemoryChangelog {
    records: Vec<StoredChangelogRecord>,
}

impl MemoryChangelog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows, in insertion order
    pub fn records(&self) -> &[StoredChangelogRecord] {
        &self.records
    }

    /// Rows written for one study version, in insertion order
    pub fn for_study(&self, study_id: &StudyId) -> Vec<&StoredChangelogRecord> {
        self.records
            .iter()
            .filter(|r| r.record.study_id == *study_id)
            .collect()
    }
}

impl ChangelogSink for MemoryChangelog {
    fn create(&mut self, record: &ChangelogRecord) -> Result<ChangelogId> {
        let id = ChangelogId(self.records.len() as i64 + 1);
        self.records.push(StoredChangelogRecord {
            id,
            record: record.clone(),
        });
        Ok(id)
    }
}
