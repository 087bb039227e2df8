use crate::diff::ordering::ReorderStrategyKind;
use serde::Deserialize;

/// Options for one changelog computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangelogOptions {
    /// Which moved siblings get a `Reordered` row
    pub reorder_strategy: ReorderStrategyKind,

    /// Compute the rows without writing them to the sink
    pub dry_run: bool,
}
