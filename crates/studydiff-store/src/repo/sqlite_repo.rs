//! SQLite repository implementation
//!
//! Persists studies, snapshot rows and changelog rows. Every method takes a
//! `&Connection`; pass a `&Transaction` to run it inside a unit of work.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::columns::{parsed, parsed_opt, text_opt};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use studydiff_core::model::{
    AnswerSnapshot, ChangelogRecord, ManagedListAssignmentSnapshot, ManagedListEntitySnapshot,
    QuestionLineSnapshot, StoredChangelogRecord, Study,
};
use studydiff_core_types::{ChangelogId, SnapshotId, StudyId};

/// SQLite repository for studies, snapshots and the changelog
pub struct SqliteRepo;

const STUDY_COLUMNS: &str =
    "id, version, status, parent_study_id, master_study_id, is_snapshot_created";

const LINE_COLUMNS: &str =
    "snapshot_id, study_id, question_line_id, module_id, sort_order, question_title, scripter_notes";

const ANSWER_COLUMNS: &str = "snapshot_id, line_snapshot_id, answer_id, identifier, location, \
     title, customer_property, is_active, is_exclusive, is_fixed, is_open, is_translatable, \
     source_id, source_name, version, effective_date, end_date, display_order";

const ASSIGNMENT_COLUMNS: &str =
    "snapshot_id, line_snapshot_id, assignment_id, managed_list_id, location";

const ENTITY_COLUMNS: &str = "snapshot_id, assignment_snapshot_id, entity_id, name, display_order";

const CHANGELOG_COLUMNS: &str = "id, study_id, former_study_id, line_snapshot_id, \
     former_line_snapshot_id, related_object, change_kind, changed_field, answer_snapshot_id, \
     former_answer_snapshot_id, module_id, managed_list_id, managed_list_entity_id, old_value, \
     new_value, old_date_value, new_date_value";

fn study_from_row(row: &Row<'_>) -> rusqlite::Result<Study> {
    Ok(Study {
        id: parsed(row, 0)?,
        version: row.get(1)?,
        status: parsed(row, 2)?,
        parent_study_id: parsed_opt(row, 3)?,
        master_study_id: parsed_opt(row, 4)?,
        is_snapshot_created: row.get(5)?,
    })
}

fn line_from_row(row: &Row<'_>) -> rusqlite::Result<QuestionLineSnapshot> {
    Ok(QuestionLineSnapshot {
        snapshot_id: parsed(row, 0)?,
        study_id: parsed(row, 1)?,
        question_line_id: parsed(row, 2)?,
        module_id: parsed_opt(row, 3)?,
        sort_order: row.get(4)?,
        question_title: row.get(5)?,
        scripter_notes: row.get(6)?,
    })
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<AnswerSnapshot> {
    Ok(AnswerSnapshot {
        snapshot_id: parsed(row, 0)?,
        line_snapshot_id: parsed(row, 1)?,
        answer_id: parsed(row, 2)?,
        identifier: row.get(3)?,
        location: row.get(4)?,
        title: row.get(5)?,
        customer_property: row.get(6)?,
        is_active: row.get(7)?,
        is_exclusive: row.get(8)?,
        is_fixed: row.get(9)?,
        is_open: row.get(10)?,
        is_translatable: row.get(11)?,
        source_id: row.get(12)?,
        source_name: row.get(13)?,
        version: row.get(14)?,
        effective_date: parsed_opt(row, 15)?,
        end_date: parsed_opt(row, 16)?,
        display_order: row.get(17)?,
    })
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<ManagedListAssignmentSnapshot> {
    Ok(ManagedListAssignmentSnapshot {
        snapshot_id: parsed(row, 0)?,
        line_snapshot_id: parsed(row, 1)?,
        assignment_id: parsed(row, 2)?,
        managed_list_id: parsed_opt(row, 3)?,
        location: parsed(row, 4)?,
    })
}

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<ManagedListEntitySnapshot> {
    Ok(ManagedListEntitySnapshot {
        snapshot_id: parsed(row, 0)?,
        assignment_snapshot_id: parsed(row, 1)?,
        entity_id: parsed(row, 2)?,
        name: row.get(3)?,
        display_order: row.get(4)?,
    })
}

fn changelog_from_row(row: &Row<'_>) -> rusqlite::Result<StoredChangelogRecord> {
    Ok(StoredChangelogRecord {
        id: ChangelogId(row.get(0)?),
        record: ChangelogRecord {
            study_id: parsed(row, 1)?,
            former_study_id: parsed(row, 2)?,
            line_snapshot_id: parsed_opt(row, 3)?,
            former_line_snapshot_id: parsed_opt(row, 4)?,
            related_object: parsed(row, 5)?,
            change_kind: parsed(row, 6)?,
            changed_field: parsed_opt(row, 7)?,
            answer_snapshot_id: parsed_opt(row, 8)?,
            former_answer_snapshot_id: parsed_opt(row, 9)?,
            module_id: parsed_opt(row, 10)?,
            managed_list_id: parsed_opt(row, 11)?,
            managed_list_entity_id: parsed_opt(row, 12)?,
            old_value: row.get(13)?,
            new_value: row.get(14)?,
            old_date_value: row.get(15)?,
            new_date_value: row.get(16)?,
        },
    })
}

fn query_all<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(params, map)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

impl SqliteRepo {
    /// Insert a study version, or update it if it already exists
    pub fn persist_study(conn: &Connection, study: &Study) -> Result<()> {
        let now = Utc::now().timestamp();
        conn.execute(
            "INSERT INTO studies (id, version, status, parent_study_id, master_study_id, is_snapshot_created, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(id) DO UPDATE SET
                version = excluded.version,
                status = excluded.status,
                parent_study_id = excluded.parent_study_id,
                master_study_id = excluded.master_study_id,
                is_snapshot_created = excluded.is_snapshot_created,
                updated_at = excluded.updated_at",
            rusqlite::params![
                study.id.to_string(),
                study.version,
                study.status.as_str(),
                text_opt(study.parent_study_id),
                text_opt(study.master_study_id),
                study.is_snapshot_created,
                now,
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get a study version by id
    pub fn get_study(conn: &Connection, study_id: &StudyId) -> Result<Option<Study>> {
        conn.query_row(
            &format!("SELECT {} FROM studies WHERE id = ?1", STUDY_COLUMNS),
            [study_id.to_string()],
            study_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Open a new snapshot batch for a study and return its id
    pub fn create_snapshot_batch(conn: &Connection, study_id: &StudyId) -> Result<i64> {
        conn.execute(
            "INSERT INTO snapshot_batches (study_id, created_at) VALUES (?1, ?2)",
            rusqlite::params![study_id.to_string(), Utc::now().timestamp_millis()],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    /// Latest snapshot batch of a study (highest created_at, then id)
    pub fn latest_snapshot_batch(conn: &Connection, study_id: &StudyId) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT id FROM snapshot_batches WHERE study_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT 1",
            [study_id.to_string()],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn insert_question_line(
        conn: &Connection,
        batch_id: i64,
        line: &QuestionLineSnapshot,
    ) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO question_line_snapshots (batch_id, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                LINE_COLUMNS
            ),
            rusqlite::params![
                batch_id,
                line.snapshot_id.to_string(),
                line.study_id.to_string(),
                line.question_line_id.to_string(),
                text_opt(line.module_id),
                line.sort_order,
                line.question_title,
                line.scripter_notes,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn insert_answer(conn: &Connection, answer: &AnswerSnapshot) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO answer_snapshots ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                ANSWER_COLUMNS
            ),
            rusqlite::params![
                answer.snapshot_id.to_string(),
                answer.line_snapshot_id.to_string(),
                answer.answer_id.to_string(),
                answer.identifier,
                answer.location,
                answer.title,
                answer.customer_property,
                answer.is_active,
                answer.is_exclusive,
                answer.is_fixed,
                answer.is_open,
                answer.is_translatable,
                answer.source_id,
                answer.source_name,
                answer.version,
                answer.effective_date.map(|d| d.to_rfc3339()),
                answer.end_date.map(|d| d.to_rfc3339()),
                answer.display_order,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn insert_assignment(
        conn: &Connection,
        assignment: &ManagedListAssignmentSnapshot,
    ) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO managed_list_assignment_snapshots ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                ASSIGNMENT_COLUMNS
            ),
            rusqlite::params![
                assignment.snapshot_id.to_string(),
                assignment.line_snapshot_id.to_string(),
                assignment.assignment_id.to_string(),
                text_opt(assignment.managed_list_id),
                assignment.location.as_str(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn insert_entity(conn: &Connection, entity: &ManagedListEntitySnapshot) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO managed_list_entity_snapshots ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                ENTITY_COLUMNS
            ),
            rusqlite::params![
                entity.snapshot_id.to_string(),
                entity.assignment_snapshot_id.to_string(),
                entity.entity_id.to_string(),
                entity.name,
                entity.display_order,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Line snapshots of one batch
    pub fn list_question_lines(conn: &Connection, batch_id: i64) -> Result<Vec<QuestionLineSnapshot>> {
        query_all(
            conn,
            &format!(
                "SELECT {} FROM question_line_snapshots WHERE batch_id = ?1",
                LINE_COLUMNS
            ),
            [batch_id],
            line_from_row,
        )
    }

    pub fn list_answers(conn: &Connection, line_snapshot_id: &SnapshotId) -> Result<Vec<AnswerSnapshot>> {
        query_all(
            conn,
            &format!(
                "SELECT {} FROM answer_snapshots WHERE line_snapshot_id = ?1",
                ANSWER_COLUMNS
            ),
            [line_snapshot_id.to_string()],
            answer_from_row,
        )
    }

    pub fn list_assignments(
        conn: &Connection,
        line_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListAssignmentSnapshot>> {
        query_all(
            conn,
            &format!(
                "SELECT {} FROM managed_list_assignment_snapshots WHERE line_snapshot_id = ?1",
                ASSIGNMENT_COLUMNS
            ),
            [line_snapshot_id.to_string()],
            assignment_from_row,
        )
    }

    pub fn list_entities(
        conn: &Connection,
        assignment_snapshot_id: &SnapshotId,
    ) -> Result<Vec<ManagedListEntitySnapshot>> {
        query_all(
            conn,
            &format!(
                "SELECT {} FROM managed_list_entity_snapshots WHERE assignment_snapshot_id = ?1",
                ENTITY_COLUMNS
            ),
            [assignment_snapshot_id.to_string()],
            entity_from_row,
        )
    }

    /// Append one changelog row and return its id
    pub fn insert_changelog(conn: &Connection, record: &ChangelogRecord) -> Result<ChangelogId> {
        conn.execute(
            "INSERT INTO study_changelog (study_id, former_study_id, line_snapshot_id,
                former_line_snapshot_id, related_object, change_kind, changed_field,
                answer_snapshot_id, former_answer_snapshot_id, module_id, managed_list_id,
                managed_list_entity_id, old_value, new_value, old_date_value, new_date_value,
                created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            rusqlite::params![
                record.study_id.to_string(),
                record.former_study_id.to_string(),
                text_opt(record.line_snapshot_id),
                text_opt(record.former_line_snapshot_id),
                record.related_object.as_str(),
                record.change_kind.as_str(),
                record.changed_field.map(|f| f.as_str()),
                text_opt(record.answer_snapshot_id),
                text_opt(record.former_answer_snapshot_id),
                text_opt(record.module_id),
                text_opt(record.managed_list_id),
                text_opt(record.managed_list_entity_id),
                record.old_value,
                record.new_value,
                record.old_date_value,
                record.new_date_value,
                Utc::now().timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(ChangelogId(conn.last_insert_rowid()))
    }

    /// Changelog rows of one study version, in insertion order
    pub fn list_changelog(conn: &Connection, study_id: &StudyId) -> Result<Vec<StoredChangelogRecord>> {
        query_all(
            conn,
            &format!(
                "SELECT {} FROM study_changelog WHERE study_id = ?1 ORDER BY id",
                CHANGELOG_COLUMNS
            ),
            [study_id.to_string()],
            changelog_from_row,
        )
    }
}
