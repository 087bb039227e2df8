//! Per-kind field maps and the field comparator.
//!
//! Each snapshot kind implements [`Diffable`], which exposes its stable
//! identity, its sibling order value and a fixed, ordered field map. The
//! comparator walks the map; no field-specific branching lives anywhere else.

use crate::model::{
    AnswerSnapshot, ChangedField, DiffValue, ManagedListAssignmentSnapshot,
    ManagedListEntitySnapshot, QuestionLineSnapshot, RelatedObject,
};
use chrono::{DateTime, Utc};
use studydiff_core_types::DomainId;

/// One entry of a field map
pub struct FieldSpec<T> {
    pub field: ChangedField,
    pub read: fn(&T) -> Option<DiffValue>,
}

/// A snapshot kind that can be matched and compared across versions
///
/// Field maps are `'static` tables, so implementors must be `'static` too.
pub trait Diffable: Sized + 'static {
    /// The related object reported for this kind
    const KIND: RelatedObject;

    /// Stable identity used to pair records across versions
    fn domain_id(&self) -> DomainId;

    /// Sort/display order among siblings; `None` for unordered kinds
    fn order_key(&self) -> Option<i64>;

    /// Ordered field map compared by [`compare_fields`]
    fn field_map() -> &'static [FieldSpec<Self>];
}

/// One field that differs between the current and the parent record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: ChangedField,
    pub old: Option<DiffValue>,
    pub new: Option<DiffValue>,
}

/// Compare two records of the same kind field by field.
///
/// Equality is null-safe: two absent values are equal, an absent and a
/// present value are not. Diffs come back in field-map order.
pub fn compare_fields<T: Diffable>(current: &T, parent: &T) -> Vec<FieldDiff> {
    T::field_map()
        .iter()
        .filter_map(|spec| {
            let new = (spec.read)(current);
            let old = (spec.read)(parent);
            (old != new).then_some(FieldDiff {
                field: spec.field,
                old,
                new,
            })
        })
        .collect()
}

fn text(value: &Option<String>) -> Option<DiffValue> {
    value.clone().map(DiffValue::Text)
}

fn flag(value: bool) -> Option<DiffValue> {
    Some(DiffValue::Text(value.to_string()))
}

fn date(value: &Option<DateTime<Utc>>) -> Option<DiffValue> {
    value.map(DiffValue::Date)
}

const QUESTION_FIELDS: &[FieldSpec<QuestionLineSnapshot>] = &[FieldSpec {
    field: ChangedField::ScripterNotes,
    read: |q| text(&q.scripter_notes),
}];

const ANSWER_FIELDS: &[FieldSpec<AnswerSnapshot>] = &[
    FieldSpec {
        field: ChangedField::AnswerIdentifier,
        read: |a| text(&a.identifier),
    },
    FieldSpec {
        field: ChangedField::AnswerLocation,
        read: |a| text(&a.location),
    },
    FieldSpec {
        field: ChangedField::AnswerTitle,
        read: |a| text(&a.title),
    },
    FieldSpec {
        field: ChangedField::CustomerProperty,
        read: |a| text(&a.customer_property),
    },
    FieldSpec {
        field: ChangedField::IsActive,
        read: |a| flag(a.is_active),
    },
    FieldSpec {
        field: ChangedField::IsExclusive,
        read: |a| flag(a.is_exclusive),
    },
    FieldSpec {
        field: ChangedField::IsFixed,
        read: |a| flag(a.is_fixed),
    },
    FieldSpec {
        field: ChangedField::IsOpen,
        read: |a| flag(a.is_open),
    },
    FieldSpec {
        field: ChangedField::IsTranslatable,
        read: |a| flag(a.is_translatable),
    },
    FieldSpec {
        field: ChangedField::SourceId,
        read: |a| text(&a.source_id),
    },
    FieldSpec {
        field: ChangedField::SourceName,
        read: |a| text(&a.source_name),
    },
    FieldSpec {
        field: ChangedField::AnswerVersion,
        read: |a| text(&a.version),
    },
    FieldSpec {
        field: ChangedField::EffectiveDate,
        read: |a| date(&a.effective_date),
    },
    FieldSpec {
        field: ChangedField::EndDate,
        read: |a| date(&a.end_date),
    },
];

const ASSIGNMENT_FIELDS: &[FieldSpec<ManagedListAssignmentSnapshot>] = &[FieldSpec {
    field: ChangedField::ListLocation,
    read: |m| Some(DiffValue::Text(m.location.as_str().to_string())),
}];

const ENTITY_FIELDS: &[FieldSpec<ManagedListEntitySnapshot>] = &[FieldSpec {
    field: ChangedField::EntityName,
    read: |e| text(&e.name),
}];

impl Diffable for QuestionLineSnapshot {
    const KIND: RelatedObject = RelatedObject::Question;

    fn domain_id(&self) -> DomainId {
        self.question_line_id
    }

    fn order_key(&self) -> Option<i64> {
        Some(self.sort_order)
    }

    fn field_map() -> &'static [FieldSpec<Self>] {
        QUESTION_FIELDS
    }
}

impl Diffable for AnswerSnapshot {
    const KIND: RelatedObject = RelatedObject::Answer;

    fn domain_id(&self) -> DomainId {
        self.answer_id
    }

    fn order_key(&self) -> Option<i64> {
        Some(self.display_order)
    }

    fn field_map() -> &'static [FieldSpec<Self>] {
        ANSWER_FIELDS
    }
}

impl Diffable for ManagedListAssignmentSnapshot {
    const KIND: RelatedObject = RelatedObject::ManagedList;

    fn domain_id(&self) -> DomainId {
        self.assignment_id
    }

    fn order_key(&self) -> Option<i64> {
        None
    }

    fn field_map() -> &'static [FieldSpec<Self>] {
        ASSIGNMENT_FIELDS
    }
}

impl Diffable for ManagedListEntitySnapshot {
    const KIND: RelatedObject = RelatedObject::ManagedListEntity;

    fn domain_id(&self) -> DomainId {
        self.entity_id
    }

    fn order_key(&self) -> Option<i64> {
        Some(self.display_order)
    }

    fn field_map() -> &'static [FieldSpec<Self>] {
        ENTITY_FIELDS
    }
}
