use studydiff_core::diff::ChangelogOptions;
use studydiff_core::model::{
    AnswerSnapshot, ChangelogRecord, ListLocation, ManagedListAssignmentSnapshot,
    ManagedListEntitySnapshot, QuestionLineSnapshot, Study,
};
use studydiff_core::{compute_changelog, MemoryChangelog, MemoryStore, Result, SnapshotSource};
use studydiff_core_types::{DomainId, StudyId};

/// A parent version (v1) and its successor (v2), both with snapshots
///
/// Content is built on v1, then `branch()` copies it into v2 where tests
/// edit it before computing the changelog.
#[allow(dead_code)]
pub struct Fixture {
    pub store: MemoryStore,
    pub v1: Study,
    pub v2: Study,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        let mut v1 = Study::first_version(StudyId::new());
        v1.is_snapshot_created = true;
        let mut v2 = v1.next_version(StudyId::new());
        v2.is_snapshot_created = true;

        let mut store = MemoryStore::new();
        store.put_study(v1.clone());
        store.put_study(v2.clone());
        Self { store, v1, v2 }
    }

    /// Add a line to the parent version
    pub fn add_line(&mut self, sort_order: i64) -> QuestionLineSnapshot {
        let line = QuestionLineSnapshot::new(self.v1.id, DomainId::new(), sort_order);
        self.store.insert_line(line.clone());
        line
    }

    pub fn add_answer(
        &mut self,
        line: &QuestionLineSnapshot,
        display_order: i64,
        title: &str,
    ) -> AnswerSnapshot {
        let mut answer = AnswerSnapshot::new(line.snapshot_id, DomainId::new(), display_order);
        answer.title = Some(title.to_string());
        self.store.insert_answer(answer.clone());
        answer
    }

    pub fn add_list(
        &mut self,
        line: &QuestionLineSnapshot,
        location: ListLocation,
    ) -> ManagedListAssignmentSnapshot {
        let assignment = ManagedListAssignmentSnapshot::new(
            line.snapshot_id,
            DomainId::new(),
            DomainId::new(),
            location,
        );
        self.store.insert_assignment(assignment.clone());
        assignment
    }

    pub fn add_entity(
        &mut self,
        assignment: &ManagedListAssignmentSnapshot,
        name: &str,
        display_order: i64,
    ) -> ManagedListEntitySnapshot {
        let entity = ManagedListEntitySnapshot::new(
            assignment.snapshot_id,
            DomainId::new(),
            name,
            display_order,
        );
        self.store.insert_entity(entity.clone());
        entity
    }

    /// Copy the parent content into the current version
    pub fn branch(&mut self) -> Vec<QuestionLineSnapshot> {
        self.store.copy_snapshots(&self.v1.id, &self.v2.id).unwrap()
    }

    /// The current-version copy of a parent line
    pub fn current_line(&self, parent: &QuestionLineSnapshot) -> QuestionLineSnapshot {
        self.store
            .question_line_snapshots(&self.v2.id)
            .unwrap()
            .into_iter()
            .find(|l| l.question_line_id == parent.question_line_id)
            .unwrap()
    }

    pub fn line_mut(&mut self, line: &QuestionLineSnapshot) -> &mut QuestionLineSnapshot {
        self.store.line_mut(&line.snapshot_id).unwrap()
    }

    /// The current-version copy of a parent answer
    pub fn answer_mut(&mut self, parent: &AnswerSnapshot) -> &mut AnswerSnapshot {
        let current_line = self
            .store
            .question_line_snapshots(&self.v2.id)
            .unwrap()
            .into_iter()
            .find(|l| {
                self.store
                    .answer_snapshots(&l.snapshot_id)
                    .unwrap()
                    .iter()
                    .any(|a| a.answer_id == parent.answer_id)
            })
            .unwrap();
        self.store
            .answers_mut(&current_line.snapshot_id)
            .unwrap()
            .iter_mut()
            .find(|a| a.answer_id == parent.answer_id)
            .unwrap()
    }

    /// The current-version copy of a parent assignment
    pub fn current_assignment(
        &self,
        parent: &ManagedListAssignmentSnapshot,
    ) -> ManagedListAssignmentSnapshot {
        self.store
            .question_line_snapshots(&self.v2.id)
            .unwrap()
            .iter()
            .flat_map(|l| self.store.managed_list_assignments(&l.snapshot_id).unwrap())
            .find(|a| a.assignment_id == parent.assignment_id)
            .unwrap()
    }

    pub fn assignment_mut(
        &mut self,
        parent: &ManagedListAssignmentSnapshot,
    ) -> &mut ManagedListAssignmentSnapshot {
        let current = self.current_assignment(parent);
        self.store
            .assignments_mut(&current.line_snapshot_id)
            .unwrap()
            .iter_mut()
            .find(|a| a.assignment_id == parent.assignment_id)
            .unwrap()
    }

    pub fn entities_mut(
        &mut self,
        parent: &ManagedListAssignmentSnapshot,
    ) -> &mut Vec<ManagedListEntitySnapshot> {
        let current = self.current_assignment(parent);
        self.store.entities_mut(&current.snapshot_id).unwrap()
    }

    pub fn compute_with(
        &self,
        options: &ChangelogOptions,
    ) -> (Result<Vec<ChangelogRecord>>, MemoryChangelog) {
        let mut changelog = MemoryChangelog::new();
        let result = compute_changelog(&self.store, &mut changelog, &self.v2, options);
        (result, changelog)
    }

    /// Compute the v2 changelog with default options; panics on error
    pub fn compute(&self) -> Vec<ChangelogRecord> {
        let (result, changelog) = self.compute_with(&ChangelogOptions::default());
        let records = result.unwrap();
        assert_eq!(changelog.records().len(), records.len());
        records
    }
}
