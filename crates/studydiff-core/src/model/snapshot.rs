//! Version-scoped snapshot records
//!
//! Snapshots are immutable copies taken when a study version is created.
//! Each one carries its own [`SnapshotId`] plus the [`DomainId`] of the object
//! it copies; the latter is the only valid join key across versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use studydiff_core_types::{DomainId, ModuleId, SnapshotId, StudyId};

/// Where a managed list is rendered on its question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListLocation {
    Row,
    Column,
}

impl ListLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListLocation::Row => "row",
            ListLocation::Column => "column",
        }
    }
}

impl FromStr for ListLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "row" => Ok(ListLocation::Row),
            "column" => Ok(ListLocation::Column),
            other => Err(format!("unknown list location '{}'", other)),
        }
    }
}

/// Snapshot of one questionnaire line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionLineSnapshot {
    pub snapshot_id: SnapshotId,
    pub study_id: StudyId,
    /// Stable question-line identity
    pub question_line_id: DomainId,
    pub module_id: Option<ModuleId>,
    pub sort_order: i64,
    pub question_title: Option<String>,
    pub scripter_notes: Option<String>,
}

impl QuestionLineSnapshot {
    pub fn new(study_id: StudyId, question_line_id: DomainId, sort_order: i64) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            study_id,
            question_line_id,
            module_id: None,
            sort_order,
            question_title: None,
            scripter_notes: None,
        }
    }

    /// Copy this line into another study version under a fresh snapshot id
    pub fn copy_to(&self, study_id: StudyId) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            study_id,
            ..self.clone()
        }
    }
}

/// Snapshot of one answer on a question line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSnapshot {
    pub snapshot_id: SnapshotId,
    pub line_snapshot_id: SnapshotId,
    /// Stable answer identity
    pub answer_id: DomainId,
    pub identifier: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub customer_property: Option<String>,
    pub is_active: bool,
    pub is_exclusive: bool,
    pub is_fixed: bool,
    pub is_open: bool,
    pub is_translatable: bool,
    pub source_id: Option<String>,
    pub source_name: Option<String>,
    pub version: Option<String>,
    pub effective_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub display_order: i64,
}

impl AnswerSnapshot {
    pub fn new(line_snapshot_id: SnapshotId, answer_id: DomainId, display_order: i64) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            line_snapshot_id,
            answer_id,
            identifier: None,
            location: None,
            title: None,
            customer_property: None,
            is_active: true,
            is_exclusive: false,
            is_fixed: false,
            is_open: false,
            is_translatable: true,
            source_id: None,
            source_name: None,
            version: None,
            effective_date: None,
            end_date: None,
            display_order,
        }
    }

    /// Copy this answer under another line snapshot with a fresh snapshot id
    pub fn copy_to(&self, line_snapshot_id: SnapshotId) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            line_snapshot_id,
            ..self.clone()
        }
    }
}

/// Snapshot of a managed list assigned to a question line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedListAssignmentSnapshot {
    pub snapshot_id: SnapshotId,
    pub line_snapshot_id: SnapshotId,
    /// Stable list-assignment identity
    pub assignment_id: DomainId,
    /// The managed list being assigned; `None` marks a broken reference
    pub managed_list_id: Option<DomainId>,
    pub location: ListLocation,
}

impl ManagedListAssignmentSnapshot {
    pub fn new(
        line_snapshot_id: SnapshotId,
        assignment_id: DomainId,
        managed_list_id: DomainId,
        location: ListLocation,
    ) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            line_snapshot_id,
            assignment_id,
            managed_list_id: Some(managed_list_id),
            location,
        }
    }

    pub fn copy_to(&self, line_snapshot_id: SnapshotId) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            line_snapshot_id,
            ..self.clone()
        }
    }
}

/// Snapshot of one entity (item) of an assigned managed list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedListEntitySnapshot {
    pub snapshot_id: SnapshotId,
    pub assignment_snapshot_id: SnapshotId,
    /// Stable list-entity identity
    pub entity_id: DomainId,
    pub name: Option<String>,
    pub display_order: i64,
}

impl ManagedListEntitySnapshot {
    pub fn new(
        assignment_snapshot_id: SnapshotId,
        entity_id: DomainId,
        name: impl Into<String>,
        display_order: i64,
    ) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            assignment_snapshot_id,
            entity_id,
            name: Some(name.into()),
            display_order,
        }
    }

    pub fn copy_to(&self, assignment_snapshot_id: SnapshotId) -> Self {
        Self {
            snapshot_id: SnapshotId::new(),
            assignment_snapshot_id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_keeps_domain_identity_and_renews_snapshot_id() {
        let v1 = StudyId::new();
        let v2 = StudyId::new();
        let line = QuestionLineSnapshot::new(v1, DomainId::new(), 1);
        let copied = line.copy_to(v2);

        assert_eq!(copied.question_line_id, line.question_line_id);
        assert_eq!(copied.study_id, v2);
        assert_ne!(copied.snapshot_id, line.snapshot_id);
    }

    #[test]
    fn test_answer_copy_moves_to_new_line() {
        let answer = AnswerSnapshot::new(SnapshotId::new(), DomainId::new(), 3);
        let new_line = SnapshotId::new();
        let copied = answer.copy_to(new_line);

        assert_eq!(copied.line_snapshot_id, new_line);
        assert_eq!(copied.answer_id, answer.answer_id);
        assert_eq!(copied.display_order, 3);
    }

    #[test]
    fn test_list_location_codes() {
        assert_eq!("row".parse::<ListLocation>(), Ok(ListLocation::Row));
        assert_eq!(ListLocation::Column.as_str(), "column");
        assert!("grid".parse::<ListLocation>().is_err());
    }
}
