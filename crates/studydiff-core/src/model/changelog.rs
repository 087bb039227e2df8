//! Changelog output types
//!
//! Enum columns are persisted through stable lowercase codes
//! (`as_str` / `FromStr`), never through the Rust variant names.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use studydiff_core_types::{ChangelogId, DomainId, ModuleId, SnapshotId, StudyId};

/// What kind of object a changelog row is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedObject {
    Question,
    Answer,
    Module,
    ManagedList,
    ManagedListEntity,
}

impl RelatedObject {
    /// All kinds in changelog walk order
    pub const WALK_ORDER: [RelatedObject; 5] = [
        RelatedObject::Question,
        RelatedObject::Answer,
        RelatedObject::Module,
        RelatedObject::ManagedList,
        RelatedObject::ManagedListEntity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelatedObject::Question => "question",
            RelatedObject::Answer => "answer",
            RelatedObject::Module => "module",
            RelatedObject::ManagedList => "managed_list",
            RelatedObject::ManagedListEntity => "managed_list_entity",
        }
    }
}

impl FromStr for RelatedObject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelatedObject::WALK_ORDER
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown related object '{}'", s))
    }
}

impl fmt::Display for RelatedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the related object changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Reordered,
    FieldChanged,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Reordered => "reordered",
            ChangeKind::FieldChanged => "field_changed",
        }
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(ChangeKind::Added),
            "removed" => Ok(ChangeKind::Removed),
            "reordered" => Ok(ChangeKind::Reordered),
            "field_changed" => Ok(ChangeKind::FieldChanged),
            other => Err(format!("unknown change kind '{}'", other)),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a field is stored in the text or the date value slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Date,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => f.write_str("text"),
            ValueKind::Date => f.write_str("date"),
        }
    }
}

/// Every field the comparator can report, across all entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    // Question line
    ScripterNotes,

    // Answer
    AnswerIdentifier,
    AnswerLocation,
    AnswerTitle,
    CustomerProperty,
    IsActive,
    IsExclusive,
    IsFixed,
    IsOpen,
    IsTranslatable,
    SourceId,
    SourceName,
    AnswerVersion,
    EffectiveDate,
    EndDate,

    // Managed list assignment
    ListLocation,

    // Managed list entity
    EntityName,
}

impl ChangedField {
    pub const ALL: [ChangedField; 17] = [
        ChangedField::ScripterNotes,
        ChangedField::AnswerIdentifier,
        ChangedField::AnswerLocation,
        ChangedField::AnswerTitle,
        ChangedField::CustomerProperty,
        ChangedField::IsActive,
        ChangedField::IsExclusive,
        ChangedField::IsFixed,
        ChangedField::IsOpen,
        ChangedField::IsTranslatable,
        ChangedField::SourceId,
        ChangedField::SourceName,
        ChangedField::AnswerVersion,
        ChangedField::EffectiveDate,
        ChangedField::EndDate,
        ChangedField::ListLocation,
        ChangedField::EntityName,
    ];

    /// The entity kind that owns this field
    pub fn related_object(&self) -> RelatedObject {
        match self {
            ChangedField::ScripterNotes => RelatedObject::Question,
            ChangedField::ListLocation => RelatedObject::ManagedList,
            ChangedField::EntityName => RelatedObject::ManagedListEntity,
            _ => RelatedObject::Answer,
        }
    }

    /// Which value slot this field's old/new values go to
    pub fn value_kind(&self) -> ValueKind {
        match self {
            ChangedField::EffectiveDate | ChangedField::EndDate => ValueKind::Date,
            _ => ValueKind::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangedField::ScripterNotes => "scripter_notes",
            ChangedField::AnswerIdentifier => "answer_identifier",
            ChangedField::AnswerLocation => "answer_location",
            ChangedField::AnswerTitle => "answer_title",
            ChangedField::CustomerProperty => "customer_property",
            ChangedField::IsActive => "is_active",
            ChangedField::IsExclusive => "is_exclusive",
            ChangedField::IsFixed => "is_fixed",
            ChangedField::IsOpen => "is_open",
            ChangedField::IsTranslatable => "is_translatable",
            ChangedField::SourceId => "source_id",
            ChangedField::SourceName => "source_name",
            ChangedField::AnswerVersion => "answer_version",
            ChangedField::EffectiveDate => "effective_date",
            ChangedField::EndDate => "end_date",
            ChangedField::ListLocation => "list_location",
            ChangedField::EntityName => "entity_name",
        }
    }
}

impl FromStr for ChangedField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangedField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown changed field '{}'", s))
    }
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compared field value, tagged with the slot it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DiffValue {
    Text(String),
    Date(DateTime<Utc>),
}

impl DiffValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            DiffValue::Text(_) => ValueKind::Text,
            DiffValue::Date(_) => ValueKind::Date,
        }
    }

    /// Text form written to the changelog store
    pub fn render(&self) -> String {
        match self {
            DiffValue::Text(s) => s.clone(),
            DiffValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// One persisted difference between a study version and its parent
///
/// Text-kind values live in `old_value`/`new_value`; date-kind values are
/// rendered to RFC 3339 and live in `old_date_value`/`new_date_value`, so a
/// consumer can always tell a date-origin diff apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogRecord {
    pub study_id: StudyId,
    pub former_study_id: StudyId,
    pub line_snapshot_id: Option<SnapshotId>,
    pub former_line_snapshot_id: Option<SnapshotId>,
    pub related_object: RelatedObject,
    pub change_kind: ChangeKind,
    pub changed_field: Option<ChangedField>,
    pub answer_snapshot_id: Option<SnapshotId>,
    pub former_answer_snapshot_id: Option<SnapshotId>,
    pub module_id: Option<ModuleId>,
    pub managed_list_id: Option<DomainId>,
    pub managed_list_entity_id: Option<DomainId>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub old_date_value: Option<String>,
    pub new_date_value: Option<String>,
}

/// A changelog row together with the id the store assigned to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChangelogRecord {
    pub id: ChangelogId,
    #[serde(flatten)]
    pub record: ChangelogRecord,
}
