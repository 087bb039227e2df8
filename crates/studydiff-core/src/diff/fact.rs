//! Detected differences, before they are shaped into changelog rows.

use crate::diff::fields::FieldDiff;
use crate::model::RelatedObject;
use studydiff_core_types::{DomainId, ModuleId, SnapshotId};

/// The object a fact is about, with the references its row must carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Question,
    Answer {
        current: Option<SnapshotId>,
        former: Option<SnapshotId>,
    },
    Module {
        module_id: ModuleId,
    },
    ManagedList {
        managed_list_id: DomainId,
    },
    ManagedListEntity {
        managed_list_id: DomainId,
        entity_id: DomainId,
    },
}

impl Subject {
    pub fn related_object(&self) -> RelatedObject {
        match self {
            Subject::Question => RelatedObject::Question,
            Subject::Answer { .. } => RelatedObject::Answer,
            Subject::Module { .. } => RelatedObject::Module,
            Subject::ManagedList { .. } => RelatedObject::ManagedList,
            Subject::ManagedListEntity { .. } => RelatedObject::ManagedListEntity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added,
    Removed,
    Reordered { old: i64, new: i64 },
    FieldChanged(FieldDiff),
}

/// One difference between a study version and its parent
///
/// `current_line` / `former_line` are the owning line snapshots on each side;
/// at least one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFact {
    pub current_line: Option<SnapshotId>,
    pub former_line: Option<SnapshotId>,
    pub subject: Subject,
    pub change: Change,
}

impl DiffFact {
    pub fn related_object(&self) -> RelatedObject {
        self.subject.related_object()
    }
}
