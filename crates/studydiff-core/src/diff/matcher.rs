//! Identity matching of snapshot records across two study versions.

use crate::diff::fields::Diffable;
use crate::errors::{Result, StudyDiffError};
use std::collections::BTreeMap;
use studydiff_core_types::DomainId;

/// A record of one kind paired with its counterpart in the other version
#[derive(Debug)]
pub struct MatchedPair<'a, T> {
    pub current: Option<&'a T>,
    pub parent: Option<&'a T>,
}

impl<'a, T: Diffable> MatchedPair<'a, T> {
    pub fn domain_id(&self) -> Option<DomainId> {
        self.current.or(self.parent).map(|r| r.domain_id())
    }

    /// Both sides, when the record exists in both versions
    pub fn both(&self) -> Option<(&'a T, &'a T)> {
        self.current.zip(self.parent)
    }
}

impl<T> Clone for MatchedPair<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatchedPair<'_, T> {}

fn index_by_identity<'a, T: Diffable>(
    records: &'a [T],
    side: &str,
) -> Result<BTreeMap<DomainId, &'a T>> {
    let mut index = BTreeMap::new();
    for record in records {
        if index.insert(record.domain_id(), record).is_some() {
            return Err(StudyDiffError::DuplicateIdentity {
                kind: T::KIND.to_string(),
                domain_id: record.domain_id().to_string(),
                side: side.to_string(),
            }
            .into());
        }
    }
    Ok(index)
}

fn sort_key<T: Diffable>(record: &T) -> (Option<i64>, DomainId) {
    (record.order_key(), record.domain_id())
}

/// Pair records one-to-one by domain identity.
///
/// Every identity present on either side yields exactly one pair. The output
/// order does not depend on input order: records present in the current
/// version come first, ordered by (order value, identity), followed by
/// parent-only records in the same ordering.
///
/// # Errors
///
/// Returns `DuplicateIdentity` if one side holds two records for the same
/// domain identity.
pub fn match_by_identity<'a, T: Diffable>(
    current: &'a [T],
    parent: &'a [T],
) -> Result<Vec<MatchedPair<'a, T>>> {
    let current_index = index_by_identity(current, "current")?;
    let mut parent_index = index_by_identity(parent, "parent")?;

    let mut current_sorted: Vec<&T> = current_index.values().copied().collect();
    current_sorted.sort_by_key(|r| sort_key(*r));

    let mut pairs: Vec<MatchedPair<'a, T>> = current_sorted
        .into_iter()
        .map(|c| MatchedPair {
            current: Some(c),
            parent: parent_index.remove(&c.domain_id()),
        })
        .collect();

    let mut removed: Vec<&T> = parent_index.into_values().collect();
    removed.sort_by_key(|r| sort_key(*r));
    pairs.extend(removed.into_iter().map(|p| MatchedPair {
        current: None,
        parent: Some(p),
    }));

    Ok(pairs)
}
