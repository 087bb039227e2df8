// Integration tests for the study update command against file-backed SQLite

use rusqlite::Connection;
use studydiff_core::diff::ChangelogOptions;
use studydiff_core::errors::ExErrorKind;
use studydiff_core::logging_facility::test_capture::init_test_capture;
use studydiff_core::model::{
    AnswerSnapshot, ChangeKind, ChangedField, QuestionLineSnapshot, RelatedObject, Study,
};
use studydiff_core_types::schema::{EVENT_END, EVENT_END_ERROR};
use studydiff_core_types::{DomainId, ModuleId, RequestId, StudyId, TraceId};
use studydiff_engine::{
    apply_engine_command, apply_study_update, apply_study_update_with_context,
    compute_study_changelog, compute_study_changelog_with_context, list_study_changelog,
    CommandContext, EngineCommand, EngineCommandResult,
};
use studydiff_store::{write_snapshot_batch, SnapshotBatch, SqliteRepo};
use tempfile::TempDir;

struct TestDb {
    _dir: TempDir,
    conn: Connection,
}

fn setup_test_db() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let conn = studydiff_store::db::open_migrated(dir.path().join("studies.db")).unwrap();
    TestDb { _dir: dir, conn }
}

/// v1 (snapshotted) with one line holding one answer, and v2 stored with a
/// copy of that content but not yet marked as snapshotted
struct Versions {
    v1: Study,
    v2: Study,
    line_v2: QuestionLineSnapshot,
    answer_v2: AnswerSnapshot,
}

fn seed_versions(conn: &Connection, new_title: &str) -> Versions {
    let mut v1 = Study::first_version(StudyId::new());
    v1.is_snapshot_created = true;
    let v2 = v1.next_version(StudyId::new());
    SqliteRepo::persist_study(conn, &v1).unwrap();
    SqliteRepo::persist_study(conn, &v2).unwrap();

    let line_v1 = QuestionLineSnapshot::new(v1.id, DomainId::new(), 1);
    let mut answer_v1 = AnswerSnapshot::new(line_v1.snapshot_id, DomainId::new(), 1);
    answer_v1.title = Some("something".into());
    write_snapshot_batch(
        conn,
        &v1.id,
        &SnapshotBatch {
            lines: vec![line_v1.clone()],
            answers: vec![answer_v1.clone()],
            ..Default::default()
        },
    )
    .unwrap();

    let line_v2 = line_v1.copy_to(v2.id);
    let mut answer_v2 = answer_v1.copy_to(line_v2.snapshot_id);
    answer_v2.title = Some(new_title.to_string());
    write_snapshot_batch(
        conn,
        &v2.id,
        &SnapshotBatch {
            lines: vec![line_v2.clone()],
            answers: vec![answer_v2.clone()],
            ..Default::default()
        },
    )
    .unwrap();

    Versions {
        v1,
        v2,
        line_v2,
        answer_v2,
    }
}

fn snapshotted(study: &Study) -> Study {
    Study {
        is_snapshot_created: true,
        ..study.clone()
    }
}

#[test]
fn test_study_update_persists_study_and_changelog() {
    // Given: v2 whose answer title was edited
    let mut db = setup_test_db();
    let versions = seed_versions(&db.conn, "something - edited");

    // When: v2 is marked as snapshotted
    let updated = snapshotted(&versions.v2);
    let records =
        apply_study_update(&mut db.conn, &updated, &ChangelogOptions::default()).unwrap();

    // Then: The study row is updated
    let stored_study = SqliteRepo::get_study(&db.conn, &updated.id).unwrap().unwrap();
    assert!(stored_study.is_snapshot_created);

    // And: One answer title row is stored and returned
    assert_eq!(records.len(), 1);
    let stored = list_study_changelog(&db.conn, &updated.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record, records[0]);

    let record = &records[0];
    assert_eq!(record.former_study_id, versions.v1.id);
    assert_eq!(record.related_object, RelatedObject::Answer);
    assert_eq!(record.change_kind, ChangeKind::FieldChanged);
    assert_eq!(record.changed_field, Some(ChangedField::AnswerTitle));
    assert_eq!(record.old_value.as_deref(), Some("something"));
    assert_eq!(record.new_value.as_deref(), Some("something - edited"));
    assert_eq!(record.line_snapshot_id, Some(versions.line_v2.snapshot_id));
    assert_eq!(record.answer_snapshot_id, Some(versions.answer_v2.snapshot_id));
}

#[test]
fn test_unsnapshotted_update_writes_no_changelog() {
    let mut db = setup_test_db();
    let versions = seed_versions(&db.conn, "changed");

    let records =
        apply_study_update(&mut db.conn, &versions.v2, &ChangelogOptions::default()).unwrap();

    assert!(records.is_empty());
    assert!(list_study_changelog(&db.conn, &versions.v2.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_dangling_parent_rolls_back_everything() {
    // Given: A new study version whose parent was never stored
    let mut db = setup_test_db();
    let mut orphan = Study::first_version(StudyId::new()).next_version(StudyId::new());
    orphan.is_snapshot_created = true;

    // When: The update is applied
    let err = apply_study_update(&mut db.conn, &orphan, &ChangelogOptions::default())
        .unwrap_err();

    // Then: The failure is NotFound
    assert_eq!(err.kind(), ExErrorKind::NotFound);

    // And: Neither the study row nor any changelog row persisted
    assert_eq!(SqliteRepo::get_study(&db.conn, &orphan.id).unwrap(), None);
    assert!(list_study_changelog(&db.conn, &orphan.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_dry_run_returns_records_without_writing() {
    // Given: v2 with an edited answer
    let mut db = setup_test_db();
    let versions = seed_versions(&db.conn, "edited");
    let updated = snapshotted(&versions.v2);

    // When: The update is applied as a dry run
    let options = ChangelogOptions {
        dry_run: true,
        ..Default::default()
    };
    let records = apply_study_update(&mut db.conn, &updated, &options).unwrap();

    // Then: The records are returned
    assert_eq!(records.len(), 1);

    // And: Nothing was written, including the study update
    assert!(list_study_changelog(&db.conn, &updated.id)
        .unwrap()
        .is_empty());
    let stored_study = SqliteRepo::get_study(&db.conn, &updated.id).unwrap().unwrap();
    assert!(!stored_study.is_snapshot_created);
}

#[test]
fn test_compute_stored_study_changelog() {
    // Given: v2 already stored as snapshotted, with a module added to its line
    let mut db = setup_test_db();
    let mut v1 = Study::first_version(StudyId::new());
    v1.is_snapshot_created = true;
    let mut v2 = v1.next_version(StudyId::new());
    v2.is_snapshot_created = true;
    SqliteRepo::persist_study(&db.conn, &v1).unwrap();
    SqliteRepo::persist_study(&db.conn, &v2).unwrap();
    write_snapshot_batch(&db.conn, &v1.id, &SnapshotBatch::default()).unwrap();

    let mut line = QuestionLineSnapshot::new(v2.id, DomainId::new(), 1);
    let module_id = ModuleId::new();
    line.module_id = Some(module_id);
    write_snapshot_batch(
        &db.conn,
        &v2.id,
        &SnapshotBatch {
            lines: vec![line.clone()],
            ..Default::default()
        },
    )
    .unwrap();

    // When: Its changelog is computed by id
    let records =
        compute_study_changelog(&mut db.conn, &v2.id, &ChangelogOptions::default()).unwrap();

    // Then: The added line is reported as a module addition
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].related_object, RelatedObject::Module);
    assert_eq!(records[0].change_kind, ChangeKind::Added);
    assert_eq!(records[0].module_id, Some(module_id));
    assert_eq!(records[0].line_snapshot_id, Some(line.snapshot_id));
    assert_eq!(records[0].former_line_snapshot_id, None);
    assert_eq!(list_study_changelog(&db.conn, &v2.id).unwrap().len(), 1);
}

#[test]
fn test_compute_unknown_study_is_not_found() {
    let mut db = setup_test_db();
    let err = compute_study_changelog(&mut db.conn, &StudyId::new(), &ChangelogOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_engine_command_dispatch() {
    let mut db = setup_test_db();
    let versions = seed_versions(&db.conn, "edited");

    let result = apply_engine_command(
        EngineCommand::StudyUpdated {
            study: snapshotted(&versions.v2),
            options: ChangelogOptions::default(),
        },
        &mut db.conn,
    )
    .unwrap();

    match result {
        EngineCommandResult::Changelog(records) => assert_eq!(records.len(), 1),
    }
}

#[test]
fn test_study_update_logs_boundaries() {
    let capture = init_test_capture();
    let mut db = setup_test_db();
    let versions = seed_versions(&db.conn, "edited");
    let updated = snapshotted(&versions.v2);

    apply_study_update(&mut db.conn, &updated, &ChangelogOptions::default()).unwrap();

    let study = updated.id.to_string();
    let ends: Vec<_> = capture
        .events_for_op("apply_study_update")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .filter(|e| e.field("study_id") == Some(study.as_str()))
        .collect();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("record_count"), Some("1"));
}

#[test]
fn test_failed_update_logs_end_error() {
    let capture = init_test_capture();
    let mut db = setup_test_db();
    let mut orphan = Study::first_version(StudyId::new()).next_version(StudyId::new());
    orphan.is_snapshot_created = true;

    let _ = apply_study_update(&mut db.conn, &orphan, &ChangelogOptions::default());

    let study = orphan.id.to_string();
    let errors: Vec<_> = capture
        .events_for_op("apply_study_update")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .filter(|e| e.field("study_id") == Some(study.as_str()))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err_code"), Some("ERR_NOT_FOUND"));
}

#[test]
fn test_failed_update_carries_correlation_ids() {
    // Given: A caller context and a study whose parent was never stored
    let capture = init_test_capture();
    let mut db = setup_test_db();
    let mut orphan = Study::first_version(StudyId::new()).next_version(StudyId::new());
    orphan.is_snapshot_created = true;
    let request_id = RequestId::new();
    let trace_id = TraceId::new();
    let ctx = CommandContext::default()
        .with_request_id(request_id)
        .with_trace_id(trace_id);

    // When: The update is applied under that context
    let err = apply_study_update_with_context(
        &mut db.conn,
        &orphan,
        &ChangelogOptions::default(),
        &ctx,
    )
    .unwrap_err();

    // Then: The returned error carries both ids
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.request_id(), Some(&request_id));
    assert_eq!(err.trace_id(), Some(&trace_id));

    // And: The end_error event is tagged with the request id
    let request = request_id.to_string();
    let errors: Vec<_> = capture
        .events_for_op("apply_study_update")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .filter(|e| e.field("request_id") == Some(request.as_str()))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("trace_id"), Some(trace_id.to_string().as_str()));
}

#[test]
fn test_compute_unknown_study_carries_request_id() {
    let mut db = setup_test_db();
    let request_id = RequestId::new();
    let ctx = CommandContext::default().with_request_id(request_id);

    let err = compute_study_changelog_with_context(
        &mut db.conn,
        &StudyId::new(),
        &ChangelogOptions::default(),
        &ctx,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.request_id(), Some(&request_id));
    assert_eq!(err.trace_id(), None);
}

#[test]
fn test_plain_update_errors_carry_no_correlation_ids() {
    let mut db = setup_test_db();
    let mut orphan = Study::first_version(StudyId::new()).next_version(StudyId::new());
    orphan.is_snapshot_created = true;

    let err = apply_study_update(&mut db.conn, &orphan, &ChangelogOptions::default())
        .unwrap_err();

    assert_eq!(err.request_id(), None);
    assert_eq!(err.trace_id(), None);
}

/// v1 and snapshotted v2 with three answers on one line, the third dragged
/// to the top in v2
fn seed_rotated_answers(conn: &Connection) -> (Study, AnswerSnapshot) {
    let mut v1 = Study::first_version(StudyId::new());
    v1.is_snapshot_created = true;
    let v2 = v1.next_version(StudyId::new());
    SqliteRepo::persist_study(conn, &v1).unwrap();
    SqliteRepo::persist_study(conn, &v2).unwrap();

    let line_v1 = QuestionLineSnapshot::new(v1.id, DomainId::new(), 1);
    let answers_v1: Vec<AnswerSnapshot> = (1..=3)
        .map(|order| AnswerSnapshot::new(line_v1.snapshot_id, DomainId::new(), order))
        .collect();
    write_snapshot_batch(
        conn,
        &v1.id,
        &SnapshotBatch {
            lines: vec![line_v1.clone()],
            answers: answers_v1.clone(),
            ..Default::default()
        },
    )
    .unwrap();

    let line_v2 = line_v1.copy_to(v2.id);
    let answers_v2: Vec<AnswerSnapshot> = answers_v1
        .iter()
        .map(|a| {
            let mut copy = a.copy_to(line_v2.snapshot_id);
            copy.display_order = if a.display_order == 3 { 1 } else { a.display_order + 1 };
            copy
        })
        .collect();
    write_snapshot_batch(
        conn,
        &v2.id,
        &SnapshotBatch {
            lines: vec![line_v2],
            answers: answers_v2,
            ..Default::default()
        },
    )
    .unwrap();

    (snapshotted(&v2), answers_v1[2].clone())
}

#[test]
fn test_answer_rotation_stores_one_reorder_row() {
    // Given: Three answers where the last one moved to the top
    let mut db = setup_test_db();
    let (v2, dragged) = seed_rotated_answers(&db.conn);

    // When: The update is applied
    let records = apply_study_update(&mut db.conn, &v2, &ChangelogOptions::default()).unwrap();

    // Then: Only the dragged answer is reported
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].related_object, RelatedObject::Answer);
    assert_eq!(records[0].change_kind, ChangeKind::Reordered);
    assert_eq!(records[0].former_answer_snapshot_id, Some(dragged.snapshot_id));
    assert_eq!(records[0].old_value.as_deref(), Some("3"));
    assert_eq!(records[0].new_value.as_deref(), Some("1"));

    // And: Exactly that row is stored
    assert_eq!(list_study_changelog(&db.conn, &v2.id).unwrap().len(), 1);
}
