//! Human-readable summary renderer for study changelogs.

use crate::model::{ChangeKind, ChangelogRecord, RelatedObject};

fn section_title(related: RelatedObject) -> &'static str {
    match related {
        RelatedObject::Question => "Questions",
        RelatedObject::Answer => "Answers",
        RelatedObject::Module => "Modules",
        RelatedObject::ManagedList => "Managed Lists",
        RelatedObject::ManagedListEntity => "Managed List Entities",
    }
}

/// The most specific reference a row carries, for display
fn subject_ref(record: &ChangelogRecord) -> String {
    let id = match record.related_object {
        RelatedObject::Module => record.module_id.map(|m| m.to_string()),
        RelatedObject::ManagedList => record.managed_list_id.map(|m| m.to_string()),
        RelatedObject::ManagedListEntity => record.managed_list_entity_id.map(|e| e.to_string()),
        RelatedObject::Answer => record
            .answer_snapshot_id
            .or(record.former_answer_snapshot_id)
            .map(|a| a.to_string()),
        RelatedObject::Question => record
            .line_snapshot_id
            .or(record.former_line_snapshot_id)
            .map(|l| l.to_string()),
    };
    id.map(|s| short(&s).to_string()).unwrap_or_else(|| "-".to_string())
}

fn describe(record: &ChangelogRecord) -> String {
    let old = record
        .old_value
        .as_deref()
        .or(record.old_date_value.as_deref())
        .unwrap_or("(none)");
    let new = record
        .new_value
        .as_deref()
        .or(record.new_date_value.as_deref())
        .unwrap_or("(none)");
    match record.change_kind {
        ChangeKind::Added => "added".to_string(),
        ChangeKind::Removed => "removed".to_string(),
        ChangeKind::Reordered => format!("moved from position {} to {}", old, new),
        ChangeKind::FieldChanged => {
            let field = record
                .changed_field
                .map(|f| f.as_str())
                .unwrap_or("unknown field");
            format!("`{}`: {:?} → {:?}", field, old, new)
        }
    }
}

/// Render a Markdown summary of a study changelog.
///
/// Rows are grouped by related object in walk order; within a group they keep
/// their input order. Informational only.
pub fn render_changelog_summary(records: &[ChangelogRecord]) -> String {
    let mut out = String::new();
    out.push_str("## Study Changelog\n\n");

    let Some(first) = records.first() else {
        out.push_str("_No changes detected._\n");
        return out;
    };
    out.push_str(&format!(
        "**Study**: `{}`  \n**Compared with**: `{}`  \n**Changes**: {}\n\n",
        first.study_id,
        first.former_study_id,
        records.len()
    ));

    for related in RelatedObject::WALK_ORDER {
        let rows: Vec<&ChangelogRecord> = records
            .iter()
            .filter(|r| r.related_object == related)
            .collect();
        if rows.is_empty() {
            continue;
        }
        out.push_str(&format!("### {} ({})\n\n", section_title(related), rows.len()));
        for row in rows {
            out.push_str(&format!("- `{}` {}\n", subject_ref(row), describe(row)));
        }
        out.push('\n');
    }

    out
}

/// Shorten a UUID-like string to its first 8 chars for display.
fn short(s: &str) -> &str {
    s.get(..8).unwrap_or(s)
}
