//! Graph comparison.
//!
//! A graph is better than another for the same target when it is shallower,
//! or equally deep with fewer distinct entities. Anything else is a tie and
//! the incumbent is kept.

use std::cmp::Ordering;

use serde::Serialize;

use super::DerivationGraph;

/// The two quantities graphs are ranked by, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GraphMetrics {
    /// See [`DerivationGraph::depth`].
    pub depth: usize,
    /// See [`DerivationGraph::unique_entity_count`].
    pub unique_entities: usize,
}

/// Orders two graphs; `Less` means `a` is preferred.
#[must_use]
pub fn compare(a: &DerivationGraph, b: &DerivationGraph) -> Ordering {
    a.metrics().cmp(&b.metrics())
}

/// Returns true if `candidate` is strictly better than `incumbent`.
#[must_use]
pub fn is_better(candidate: &DerivationGraph, incumbent: &DerivationGraph) -> bool {
    compare(candidate, incumbent) == Ordering::Less
}
