//! Presentation helpers over a [`SearchOutcome`].
//!
//! Sorting and grouping are caller concerns; nothing here feeds back into
//! the search.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::derivation::{Edge, GraphMetrics};
use crate::engine::{Derivation, SearchOutcome};
use crate::entity::{Ability, EntityKey};
use crate::error::ValidationError;

/// Sort direction for [`sort_by_ability`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest score first.
    Ascending,
    /// Highest score first.
    #[default]
    Descending,
}

/// Orders derivations by the target entity's score for `ability`.
///
/// The sort is stable: entities with equal scores stay in key order.
#[must_use]
pub fn sort_by_ability(outcome: &SearchOutcome, ability: Ability, order: SortOrder) -> Vec<&Derivation> {
    let mut rows: Vec<&Derivation> = outcome.iter().collect();
    match order {
        SortOrder::Ascending => rows.sort_by_key(|d| d.entity.ability(ability)),
        SortOrder::Descending => rows.sort_by_key(|d| std::cmp::Reverse(d.entity.ability(ability))),
    }
    rows
}

/// Like [`sort_by_ability`], taking the ability by name.
///
/// # Errors
///
/// `UnknownAbility` when `ability` is not one of the ten ability names.
pub fn sort_by_ability_name<'a>(
    outcome: &'a SearchOutcome,
    ability: &str,
    order: SortOrder,
) -> Result<Vec<&'a Derivation>, ValidationError> {
    Ok(sort_by_ability(outcome, ability.parse()?, order))
}

/// Buckets derivations by graph depth, shallowest first.
#[must_use]
pub fn group_by_depth<'a, I>(derivations: I) -> BTreeMap<usize, Vec<&'a Derivation>>
where
    I: IntoIterator<Item = &'a Derivation>,
{
    let mut groups: BTreeMap<usize, Vec<&Derivation>> = BTreeMap::new();
    for derivation in derivations {
        groups
            .entry(derivation.graph.depth())
            .or_default()
            .push(derivation);
    }
    groups
}

/// Serializable summary of one derivation.
#[derive(Debug, Clone, Serialize)]
pub struct DerivationReport {
    /// Target entity key.
    pub key: EntityKey,
    /// Target display name.
    pub name: String,
    /// Target rarity.
    pub rarity: u32,
    /// Ability scores keyed by feed column name.
    pub abilities: BTreeMap<&'static str, u8>,
    /// Depth and unique-entity count, serialized inline.
    #[serde(flatten)]
    pub metrics: GraphMetrics,
    /// Labelled edges in `(parent, child)` order.
    pub edges: Vec<Edge>,
    /// See [`DerivationGraph::fingerprint`](crate::DerivationGraph::fingerprint).
    pub fingerprint: String,
}

impl From<&Derivation> for DerivationReport {
    fn from(d: &Derivation) -> Self {
        Self {
            key: d.entity.key.clone(),
            name: d.entity.name.clone(),
            rarity: d.entity.rarity,
            abilities: d
                .entity
                .abilities
                .iter()
                .map(|(ability, score)| (ability.as_str(), score))
                .collect(),
            metrics: d.graph.metrics(),
            edges: d.graph.edges().collect(),
            fingerprint: d.graph.fingerprint(),
        }
    }
}
