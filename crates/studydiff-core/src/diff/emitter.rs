//! Shapes diff facts into changelog records and writes them to a sink.

use crate::diff::fact::{Change, DiffFact, Subject};
use crate::diff::fields::FieldDiff;
use crate::errors::{Result, StudyDiffError};
use crate::model::{ChangeKind, ChangelogRecord, DiffValue};
use crate::source::ChangelogSink;
use studydiff_core_types::{ChangelogId, StudyId};

fn check_field(fact: &DiffFact, diff: &FieldDiff) -> Result<()> {
    let owner = diff.field.related_object();
    if owner != fact.related_object() {
        return Err(StudyDiffError::FieldSubjectMismatch {
            field: diff.field.to_string(),
            related_object: fact.related_object().to_string(),
        }
        .into());
    }
    let expected = diff.field.value_kind();
    let mismatched = [&diff.old, &diff.new]
        .into_iter()
        .flatten()
        .any(|v| v.kind() != expected);
    if mismatched {
        return Err(StudyDiffError::ValueKindMismatch {
            field: diff.field.to_string(),
            expected: expected.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Map one fact onto the persisted record shape.
///
/// # Errors
///
/// Returns `InvariantViolation` when a changed field does not belong to the
/// fact's subject or a value is of the wrong kind for its field.
pub fn assemble(
    study_id: StudyId,
    former_study_id: StudyId,
    fact: &DiffFact,
) -> Result<ChangelogRecord> {
    let mut record = ChangelogRecord {
        study_id,
        former_study_id,
        line_snapshot_id: fact.current_line,
        former_line_snapshot_id: fact.former_line,
        related_object: fact.related_object(),
        change_kind: ChangeKind::Added,
        changed_field: None,
        answer_snapshot_id: None,
        former_answer_snapshot_id: None,
        module_id: None,
        managed_list_id: None,
        managed_list_entity_id: None,
        old_value: None,
        new_value: None,
        old_date_value: None,
        new_date_value: None,
    };

    match &fact.subject {
        Subject::Question => {}
        Subject::Answer { current, former } => {
            record.answer_snapshot_id = *current;
            record.former_answer_snapshot_id = *former;
        }
        Subject::Module { module_id } => record.module_id = Some(*module_id),
        Subject::ManagedList { managed_list_id } => {
            record.managed_list_id = Some(*managed_list_id);
        }
        Subject::ManagedListEntity {
            managed_list_id,
            entity_id,
        } => {
            record.managed_list_id = Some(*managed_list_id);
            record.managed_list_entity_id = Some(*entity_id);
        }
    }

    match &fact.change {
        Change::Added => record.change_kind = ChangeKind::Added,
        Change::Removed => record.change_kind = ChangeKind::Removed,
        Change::Reordered { old, new } => {
            record.change_kind = ChangeKind::Reordered;
            record.old_value = Some(old.to_string());
            record.new_value = Some(new.to_string());
        }
        Change::FieldChanged(diff) => {
            check_field(fact, diff)?;
            record.change_kind = ChangeKind::FieldChanged;
            record.changed_field = Some(diff.field);
            for (value, text_slot, date_slot) in [
                (&diff.old, &mut record.old_value, &mut record.old_date_value),
                (&diff.new, &mut record.new_value, &mut record.new_date_value),
            ] {
                match value {
                    Some(v @ DiffValue::Text(_)) => *text_slot = Some(v.render()),
                    Some(v @ DiffValue::Date(_)) => *date_slot = Some(v.render()),
                    None => {}
                }
            }
        }
    }

    Ok(record)
}

/// Writes the facts of one study update to a [`ChangelogSink`]
pub struct ChangelogEmitter<S> {
    sink: S,
    study_id: StudyId,
    former_study_id: StudyId,
}

impl<S: ChangelogSink> ChangelogEmitter<S> {
    pub fn new(sink: S, study_id: StudyId, former_study_id: StudyId) -> Self {
        Self {
            sink,
            study_id,
            former_study_id,
        }
    }

    /// Validate, assemble and persist one fact.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` for malformed facts and propagates sink
    /// failures unchanged.
    pub fn emit(&mut self, fact: &DiffFact) -> Result<(ChangelogId, ChangelogRecord)> {
        let record = assemble(self.study_id, self.former_study_id, fact)?;
        let id = self.sink.create(&record)?;
        Ok((id, record))
    }
}
