pub mod changelog;
pub mod snapshot;
pub mod study;

pub use changelog::{
    ChangeKind, ChangedField, ChangelogRecord, DiffValue, RelatedObject, StoredChangelogRecord,
    ValueKind,
};
pub use snapshot::{
    AnswerSnapshot, ListLocation, ManagedListAssignmentSnapshot, ManagedListEntitySnapshot,
    QuestionLineSnapshot,
};
pub use study::{Study, StudyStatus};
