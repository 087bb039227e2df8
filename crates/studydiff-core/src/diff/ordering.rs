//! Order-change detection among matched siblings.
//!
//! A sibling group (all lines of a study, all answers of a line, all entities
//! of a list) is reordered when any matched pair's order value differs. Which
//! of the moved items get a changelog row is decided by a [`ReorderStrategy`].

use crate::diff::fields::Diffable;
use crate::diff::matcher::MatchedPair;
use serde::Deserialize;
use studydiff_core_types::DomainId;

/// Old and new order value of one matched sibling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderMove {
    pub key: DomainId,
    pub old: i64,
    pub new: i64,
}

impl OrderMove {
    pub fn moved(&self) -> bool {
        self.old != self.new
    }

    fn swaps_with(&self, other: &OrderMove) -> bool {
        self.moved() && self.old == other.new && self.new == other.old
    }
}

/// Picks which moved siblings to report.
///
/// `moves` holds every matched sibling of the group (moved or not), sorted by
/// new order value then key. Implementations return indices into `moves`;
/// every returned index must point at a moved entry, and at least one index
/// must be returned whenever any entry moved.
pub trait ReorderStrategy {
    fn select(&self, moves: &[OrderMove]) -> Vec<usize>;
}

/// Pairs off simple swaps; returns (winners, indices consumed by swaps).
///
/// For each 2-cycle only the entry whose value went down (moved up) wins.
fn collapse_swaps(moves: &[OrderMove]) -> (Vec<usize>, Vec<bool>) {
    let mut consumed = vec![false; moves.len()];
    let mut winners = Vec::new();
    for i in 0..moves.len() {
        if consumed[i] || !moves[i].moved() {
            continue;
        }
        let partner = (i + 1..moves.len()).find(|&j| !consumed[j] && moves[i].swaps_with(&moves[j]));
        if let Some(j) = partner {
            consumed[i] = true;
            consumed[j] = true;
            winners.push(if moves[i].new < moves[i].old { i } else { j });
        }
    }
    (winners, consumed)
}

/// One row per simple swap, one row per other moved item.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseSwaps;

impl ReorderStrategy for CollapseSwaps {
    fn select(&self, moves: &[OrderMove]) -> Vec<usize> {
        let (mut selected, consumed) = collapse_swaps(moves);
        selected.extend((0..moves.len()).filter(|&i| !consumed[i] && moves[i].moved()));
        selected.sort_unstable();
        selected
    }
}

/// Reports the smallest set of items whose move explains the new order.
///
/// Default strategy. Provisional: which single item a larger cycle reports
/// is a tie-break on (old order, key), not a confirmed rule.
///
/// Swaps collapse as in [`CollapseSwaps`]. For the rest, the items kept in a
/// longest run that preserved its relative order are considered stationary
/// (unmoved items are preferred in that run); everything else moved. When all
/// remaining items kept their relative order but were renumbered, the first
/// renumbered item is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalMoves;

impl ReorderStrategy for MinimalMoves {
    fn select(&self, moves: &[OrderMove]) -> Vec<usize> {
        let (mut selected, consumed) = collapse_swaps(moves);
        let rest: Vec<usize> = (0..moves.len()).filter(|&i| !consumed[i]).collect();

        // `moves` is in new order, so walking `rest` in old order and looking
        // for an increasing run of positions finds the stationary items.
        let mut by_old = rest.clone();
        by_old.sort_by_key(|&i| (moves[i].old, moves[i].key));

        let n = by_old.len();
        let weight = |i: usize| if moves[i].moved() { 1 } else { 2 };
        let mut best = vec![0u32; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        for a in 0..n {
            best[a] = weight(by_old[a]);
            for b in 0..a {
                if by_old[b] < by_old[a] && best[b] + weight(by_old[a]) > best[a] {
                    best[a] = best[b] + weight(by_old[a]);
                    prev[a] = Some(b);
                }
            }
        }

        let mut stationary = vec![false; moves.len()];
        let mut cursor = (0..n).max_by_key(|&a| (best[a], std::cmp::Reverse(a)));
        while let Some(a) = cursor {
            stationary[by_old[a]] = true;
            cursor = prev[a];
        }

        let moved_rest: Vec<usize> = rest.iter().copied().filter(|&i| moves[i].moved()).collect();
        let mut reported: Vec<usize> = moved_rest
            .iter()
            .copied()
            .filter(|&i| !stationary[i])
            .collect();
        if reported.is_empty() {
            reported.extend(moved_rest.first().copied());
        }

        selected.extend(reported);
        selected.sort_unstable();
        selected
    }
}

/// Configurable choice of built-in strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderStrategyKind {
    CollapseSwaps,
    #[default]
    MinimalMoves,
}

impl ReorderStrategyKind {
    pub fn strategy(&self) -> &'static dyn ReorderStrategy {
        match self {
            ReorderStrategyKind::CollapseSwaps => &CollapseSwaps,
            ReorderStrategyKind::MinimalMoves => &MinimalMoves,
        }
    }
}

/// A reported order change for one matched pair
#[derive(Debug, Clone, Copy)]
pub struct Reorder<'a, T> {
    pub current: &'a T,
    pub parent: &'a T,
    pub old: i64,
    pub new: i64,
}

/// Detect reordered siblings among the matched pairs of one group.
///
/// Returns the reported reorders in new order.
pub fn detect_reorders<'a, T: Diffable>(
    pairs: &[MatchedPair<'a, T>],
    strategy: &dyn ReorderStrategy,
) -> Vec<Reorder<'a, T>> {
    let mut siblings: Vec<(OrderMove, &'a T, &'a T)> = pairs
        .iter()
        .filter_map(|pair| {
            let (current, parent) = pair.both()?;
            let new = current.order_key()?;
            let old = parent.order_key()?;
            let key = current.domain_id();
            Some((OrderMove { key, old, new }, current, parent))
        })
        .collect();

    if !siblings.iter().any(|(m, _, _)| m.moved()) {
        return Vec::new();
    }

    siblings.sort_by_key(|(m, _, _)| (m.new, m.key));
    let moves: Vec<OrderMove> = siblings.iter().map(|(m, _, _)| *m).collect();

    let mut selected = strategy.select(&moves);
    selected.sort_unstable();
    selected.dedup();
    selected
        .into_iter()
        .filter_map(|i| siblings.get(i).copied())
        .filter(|(m, _, _)| m.moved())
        .map(|(m, current, parent)| Reorder {
            current,
            parent,
            old: m.old,
            new: m.new,
        })
        .collect()
}
