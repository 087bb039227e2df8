//! Changelog computation for one study update.
//!
//! [`detect_changes`] walks the matched line pairs of a study version and its
//! parent and returns [`DiffFact`]s in emission order; [`compute_changelog`]
//! checks preconditions, resolves the parent and writes the facts through a
//! [`ChangelogSink`].

use crate::diff::emitter::{assemble, ChangelogEmitter};
use crate::diff::fact::{Change, DiffFact, Subject};
use crate::diff::fields::{compare_fields, Diffable, FieldDiff};
use crate::diff::matcher::match_by_identity;
use crate::diff::options::ChangelogOptions;
use crate::diff::ordering::{detect_reorders, ReorderStrategy};
use crate::errors::{Result, StudyDiffError};
use crate::model::{
    ChangelogRecord, ManagedListAssignmentSnapshot, QuestionLineSnapshot, RelatedObject, Study,
};
use crate::source::{ChangelogSink, SnapshotSource};
use crate::{log_op_end, log_op_error, log_op_start};
use std::collections::BTreeMap;
use studydiff_core_types::schema::EVENT_SKIPPED;
use studydiff_core_types::{DomainId, SnapshotId, StudyId};

const OP: &str = "compute_changelog";

/// How one sibling differs between the two versions
enum SiblingChange<'a, T> {
    Added(&'a T),
    Removed(&'a T),
    Matched {
        current: &'a T,
        parent: &'a T,
        reorder: Option<(i64, i64)>,
        fields: Vec<FieldDiff>,
    },
}

/// Match one sibling group and classify every pair, in match order.
fn sibling_changes<'a, T: Diffable>(
    current: &'a [T],
    parent: &'a [T],
    strategy: &dyn ReorderStrategy,
) -> Result<Vec<SiblingChange<'a, T>>> {
    let pairs = match_by_identity(current, parent)?;
    let reorders: BTreeMap<DomainId, (i64, i64)> = detect_reorders(&pairs, strategy)
        .into_iter()
        .map(|r| (r.current.domain_id(), (r.old, r.new)))
        .collect();

    Ok(pairs
        .into_iter()
        .filter_map(|pair| match (pair.current, pair.parent) {
            (Some(c), None) => Some(SiblingChange::Added(c)),
            (None, Some(p)) => Some(SiblingChange::Removed(p)),
            (Some(c), Some(p)) => Some(SiblingChange::Matched {
                current: c,
                parent: p,
                reorder: reorders.get(&c.domain_id()).copied(),
                fields: compare_fields(c, p),
            }),
            (None, None) => None,
        })
        .collect())
}

/// Facts bucketed by related object; flattened in walk order
#[derive(Default)]
struct Facts {
    by_kind: BTreeMap<RelatedObject, Vec<DiffFact>>,
}

impl Facts {
    fn push(
        &mut self,
        lines: (Option<SnapshotId>, Option<SnapshotId>),
        subject: Subject,
        change: Change,
    ) {
        let fact = DiffFact {
            current_line: lines.0,
            former_line: lines.1,
            subject,
            change,
        };
        self.by_kind.entry(fact.related_object()).or_default().push(fact);
    }

    fn push_matched(
        &mut self,
        lines: (Option<SnapshotId>, Option<SnapshotId>),
        subject: Subject,
        reorder: Option<(i64, i64)>,
        fields: Vec<FieldDiff>,
    ) {
        if let Some((old, new)) = reorder {
            self.push(lines, subject.clone(), Change::Reordered { old, new });
        }
        for diff in fields {
            self.push(lines, subject.clone(), Change::FieldChanged(diff));
        }
    }

    fn into_ordered(self) -> Vec<DiffFact> {
        self.by_kind.into_values().flatten().collect()
    }
}

fn line_subject(line: &QuestionLineSnapshot) -> Subject {
    match line.module_id {
        Some(module_id) => Subject::Module { module_id },
        None => Subject::Question,
    }
}

/// Detect every difference between a study version and its parent.
///
/// Facts come back kind-major (Question, Answer, Module, ManagedList,
/// ManagedListEntity); within a kind they follow line match order. The
/// result depends only on the snapshot contents, not on the order the source
/// returns them in.
///
/// # Errors
///
/// Propagates source failures and `DuplicateIdentity` from matching.
pub fn detect_changes<S: SnapshotSource>(
    source: &S,
    current: &Study,
    parent: &Study,
    strategy: &dyn ReorderStrategy,
) -> Result<Vec<DiffFact>> {
    let current_lines = source.question_line_snapshots(&current.id)?;
    let parent_lines = source.question_line_snapshots(&parent.id)?;

    let mut facts = Facts::default();
    for change in sibling_changes(&current_lines, &parent_lines, strategy)? {
        match change {
            SiblingChange::Added(line) => {
                facts.push((Some(line.snapshot_id), None), line_subject(line), Change::Added);
            }
            SiblingChange::Removed(line) => {
                facts.push((None, Some(line.snapshot_id)), line_subject(line), Change::Removed);
            }
            SiblingChange::Matched {
                current,
                parent,
                reorder,
                fields,
            } => {
                let lines = (Some(current.snapshot_id), Some(parent.snapshot_id));
                facts.push_matched(lines, Subject::Question, reorder, fields);
                diff_answers(source, &mut facts, current, parent, strategy)?;
                diff_module(&mut facts, current, parent);
                diff_managed_lists(source, &mut facts, current, parent, strategy)?;
            }
        }
    }

    Ok(facts.into_ordered())
}

fn diff_answers<S: SnapshotSource>(
    source: &S,
    facts: &mut Facts,
    current: &QuestionLineSnapshot,
    parent: &QuestionLineSnapshot,
    strategy: &dyn ReorderStrategy,
) -> Result<()> {
    let lines = (Some(current.snapshot_id), Some(parent.snapshot_id));
    let current_answers = source.answer_snapshots(&current.snapshot_id)?;
    let parent_answers = source.answer_snapshots(&parent.snapshot_id)?;

    for change in sibling_changes(&current_answers, &parent_answers, strategy)? {
        match change {
            SiblingChange::Added(a) => {
                let subject = Subject::Answer {
                    current: Some(a.snapshot_id),
                    former: None,
                };
                facts.push(lines, subject, Change::Added);
            }
            SiblingChange::Removed(a) => {
                let subject = Subject::Answer {
                    current: None,
                    former: Some(a.snapshot_id),
                };
                facts.push(lines, subject, Change::Removed);
            }
            SiblingChange::Matched {
                current,
                parent,
                reorder,
                fields,
            } => {
                let subject = Subject::Answer {
                    current: Some(current.snapshot_id),
                    former: Some(parent.snapshot_id),
                };
                facts.push_matched(lines, subject, reorder, fields);
            }
        }
    }
    Ok(())
}

/// A module swap on a kept line reads as the old module leaving and the new
/// one arriving.
fn diff_module(facts: &mut Facts, current: &QuestionLineSnapshot, parent: &QuestionLineSnapshot) {
    if current.module_id == parent.module_id {
        return;
    }
    let lines = (Some(current.snapshot_id), Some(parent.snapshot_id));
    if let Some(module_id) = parent.module_id {
        facts.push(lines, Subject::Module { module_id }, Change::Removed);
    }
    if let Some(module_id) = current.module_id {
        facts.push(lines, Subject::Module { module_id }, Change::Added);
    }
}

fn diff_managed_lists<S: SnapshotSource>(
    source: &S,
    facts: &mut Facts,
    current: &QuestionLineSnapshot,
    parent: &QuestionLineSnapshot,
    strategy: &dyn ReorderStrategy,
) -> Result<()> {
    let lines = (Some(current.snapshot_id), Some(parent.snapshot_id));
    let current_assignments = source.managed_list_assignments(&current.snapshot_id)?;
    let parent_assignments = source.managed_list_assignments(&parent.snapshot_id)?;

    let dangling = current_assignments
        .iter()
        .chain(&parent_assignments)
        .find(|a| a.managed_list_id.is_none());
    if let Some(assignment) = dangling {
        tracing::warn!(
            op = OP,
            line_snapshot_id = %current.snapshot_id,
            parent_line_snapshot_id = %parent.snapshot_id,
            assignment_id = %assignment.assignment_id,
            "managed list assignment has no list reference; skipping managed list changes for line"
        );
        return Ok(());
    }

    for change in sibling_changes(&current_assignments, &parent_assignments, strategy)? {
        match change {
            SiblingChange::Added(a) => {
                if let Some(managed_list_id) = a.managed_list_id {
                    facts.push(lines, Subject::ManagedList { managed_list_id }, Change::Added);
                }
            }
            SiblingChange::Removed(a) => {
                if let Some(managed_list_id) = a.managed_list_id {
                    facts.push(lines, Subject::ManagedList { managed_list_id }, Change::Removed);
                }
            }
            SiblingChange::Matched {
                current: ca,
                parent: pa,
                reorder,
                fields,
            } => {
                let Some(managed_list_id) = ca.managed_list_id.or(pa.managed_list_id) else {
                    continue;
                };
                facts.push_matched(lines, Subject::ManagedList { managed_list_id }, reorder, fields);
                diff_entities(source, facts, lines, managed_list_id, ca, pa, strategy)?;
            }
        }
    }
    Ok(())
}

fn diff_entities<S: SnapshotSource>(
    source: &S,
    facts: &mut Facts,
    lines: (Option<SnapshotId>, Option<SnapshotId>),
    managed_list_id: DomainId,
    current: &ManagedListAssignmentSnapshot,
    parent: &ManagedListAssignmentSnapshot,
    strategy: &dyn ReorderStrategy,
) -> Result<()> {
    let current_entities = source.managed_list_entities(&current.snapshot_id)?;
    let parent_entities = source.managed_list_entities(&parent.snapshot_id)?;
    let subject = |entity_id| Subject::ManagedListEntity {
        managed_list_id,
        entity_id,
    };

    for change in sibling_changes(&current_entities, &parent_entities, strategy)? {
        match change {
            SiblingChange::Added(e) => facts.push(lines, subject(e.entity_id), Change::Added),
            SiblingChange::Removed(e) => facts.push(lines, subject(e.entity_id), Change::Removed),
            SiblingChange::Matched {
                current,
                reorder,
                fields,
                ..
            } => facts.push_matched(lines, subject(current.entity_id), reorder, fields),
        }
    }
    Ok(())
}

/// Compute and persist the changelog of one study update.
///
/// Returns without side effects when the study has no snapshot yet or no
/// parent version. Otherwise every detected fact is written to `sink` (unless
/// `options.dry_run`) and the assembled records are returned in emission
/// order.
///
/// # Errors
///
/// - `NotFound` if the parent study cannot be resolved
/// - `DuplicateIdentity` / `InvariantViolation` for inconsistent snapshots
/// - source and sink failures, unchanged; the caller must discard any
///   records already written
pub fn compute_changelog<S: SnapshotSource, K: ChangelogSink>(
    source: &S,
    sink: K,
    current: &Study,
    options: &ChangelogOptions,
) -> Result<Vec<ChangelogRecord>> {
    if !current.is_snapshot_created {
        tracing::debug!(
            op = OP,
            event = EVENT_SKIPPED,
            study_id = %current.id,
            reason = "snapshot not created"
        );
        return Ok(Vec::new());
    }
    let Some(parent_study_id) = current.parent_study_id else {
        tracing::debug!(
            op = OP,
            event = EVENT_SKIPPED,
            study_id = %current.id,
            reason = "no parent study"
        );
        return Ok(Vec::new());
    };

    log_op_start!(OP, study_id = %current.id, parent_study_id = %parent_study_id);
    let start = std::time::Instant::now();

    let records = compute_changelog_impl(source, sink, current, parent_study_id, options)
        .map_err(|e| {
            log_op_error!(
                OP,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                study_id = %current.id
            );
            e
        })?;

    log_op_end!(
        OP,
        duration_ms = start.elapsed().as_millis() as u64,
        study_id = %current.id,
        record_count = records.len()
    );
    Ok(records)
}

fn compute_changelog_impl<S: SnapshotSource, K: ChangelogSink>(
    source: &S,
    sink: K,
    current: &Study,
    parent_study_id: StudyId,
    options: &ChangelogOptions,
) -> Result<Vec<ChangelogRecord>> {
    let parent = source
        .study(&parent_study_id)?
        .ok_or_else(|| StudyDiffError::ParentStudyNotFound {
            study_id: current.id.to_string(),
            parent_study_id: parent_study_id.to_string(),
        })?;

    let facts = detect_changes(source, current, &parent, options.reorder_strategy.strategy())?;

    if options.dry_run {
        return facts
            .iter()
            .map(|fact| assemble(current.id, parent.id, fact))
            .collect();
    }

    let mut emitter = ChangelogEmitter::new(sink, current.id, parent.id);
    facts
        .iter()
        .map(|fact| emitter.emit(fact).map(|(_, record)| record))
        .collect()
}
