//! Generational combination search.
//!
//! Starting from a set of owned entities, each round pairs every entity known
//! so far with every other one, looks the pair up in the combination table and
//! proposes a derivation graph for the child. A proposal replaces the child's
//! current best graph only when it is strictly better. Entities discovered in
//! a round become eligible as parents from the next round on.
//!
//! The engine is synchronous and owns all mutable search state for the
//! duration of one call. Catalog and table are shared read-only, so one
//! engine can serve concurrent searches.

mod scan;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{CombinationTable, EntityCatalog};
use crate::derivation::{is_better, DerivationGraph};
use crate::entity::{Entity, EntityKey};
use crate::error::BreedResult;

use self::scan::{propose, ScanInput};

/// Shared flag that stops a search between rounds.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect before the next round starts.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No starting entities; no round was run.
    EmptyStart,
    /// The depth bound was reached.
    DepthReached,
    /// A round discovered no new entity.
    FixedPoint,
    /// The cancel token was set between rounds.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStart => write!(f, "empty start"),
            Self::DepthReached => write!(f, "depth reached"),
            Self::FixedPoint => write!(f, "fixed point"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An entity together with its best derivation graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    /// The target entity.
    pub entity: Entity,
    /// Best known graph for producing it.
    pub graph: DerivationGraph,
}

/// Result of one search: the best graph for every reachable entity.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    derivations: BTreeMap<EntityKey, Derivation>,
    rounds: u32,
    stop_reason: StopReason,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            derivations: BTreeMap::new(),
            rounds: 0,
            stop_reason: StopReason::EmptyStart,
        }
    }

    /// Best derivation for `key`, if reachable.
    #[must_use]
    pub fn get(&self, key: &EntityKey) -> Option<&Derivation> {
        self.derivations.get(key)
    }

    /// Derivations in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Derivation> {
        self.derivations.values()
    }

    /// Number of entities with a derivation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.derivations.len()
    }

    /// Returns true if nothing was derived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.derivations.is_empty()
    }

    /// Rounds actually executed.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Why the search stopped.
    #[must_use]
    pub const fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    /// Takes ownership of the key → derivation map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<EntityKey, Derivation> {
        self.derivations
    }
}

/// Mutable state of one search call.
struct SearchState {
    known: Vec<Entity>,
    reachable: HashSet<EntityKey>,
    best: HashMap<EntityKey, DerivationGraph>,
}

impl SearchState {
    fn new(starting: &[Entity]) -> Self {
        let mut known = Vec::with_capacity(starting.len());
        let mut reachable = HashSet::with_capacity(starting.len());
        for entity in starting {
            if reachable.insert(entity.key.clone()) {
                known.push(entity.clone());
            }
        }
        Self {
            known,
            reachable,
            best: HashMap::new(),
        }
    }

    /// Builds the candidate graph for `p1 × p2 → child`, folding in each
    /// parent's best graph unless that graph already contains the child.
    fn candidate(&self, p1: &EntityKey, p2: &EntityKey, child: &EntityKey) -> DerivationGraph {
        let mut candidate = DerivationGraph::new(child.clone());
        candidate.add_combination(p1, p2, child);
        for parent in [p1, p2] {
            if let Some(parent_graph) = self.best.get(parent) {
                if !parent_graph.contains(child) {
                    candidate.merge(parent_graph);
                }
            }
        }
        candidate
    }

    /// Keeps `candidate` if it is the first or a strictly better graph.
    fn offer(&mut self, candidate: DerivationGraph) -> bool {
        let improves = self
            .best
            .get(candidate.root())
            .map_or(true, |incumbent| is_better(&candidate, incumbent));
        if improves {
            self.best.insert(candidate.root().clone(), candidate);
        }
        improves
    }
}

/// Counters for one round, used for logging.
#[derive(Debug, Default)]
struct RoundStats {
    frontier: usize,
    proposals: usize,
    replaced: usize,
    discovered: usize,
}

/// The generational search engine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use breedpath::{CombinationTable, Entity, EntityCatalog, EntityKey, SearchEngine};
///
/// let a = Entity::new("a", "A", 1);
/// let b = Entity::new("b", "B", 1);
/// let c = Entity::new("c", "C", 2);
/// let catalog = EntityCatalog::from_entities([a.clone(), b.clone(), c]);
/// let table = CombinationTable::from_triples([("a", "b", "c")]);
///
/// let engine = SearchEngine::new(Arc::new(catalog), Arc::new(table));
/// let outcome = engine.search(&[a, b], 1).unwrap();
/// let c = outcome.get(&EntityKey::from("c")).unwrap();
/// assert_eq!(c.graph.depth(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SearchEngine {
    catalog: Arc<EntityCatalog>,
    table: Arc<CombinationTable>,
    workers: usize,
    cancel: Option<CancelToken>,
}

impl SearchEngine {
    /// Creates an engine that scans inline on the calling thread.
    #[must_use]
    pub fn new(catalog: Arc<EntityCatalog>, table: Arc<CombinationTable>) -> Self {
        Self {
            catalog,
            table,
            workers: 1,
            cancel: None,
        }
    }

    /// Spreads the per-round pair scan over `workers` threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Checks `token` between rounds.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The catalog this engine reads.
    #[must_use]
    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// The combination table this engine reads.
    #[must_use]
    pub fn table(&self) -> &CombinationTable {
        &self.table
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Finds the best derivation graph of every entity reachable from
    /// `starting` within `depth` rounds.
    ///
    /// Repeated starting keys are ignored. An empty start or a depth of 0
    /// returns an empty outcome without running a round.
    ///
    /// # Errors
    ///
    /// Only fails if a scan worker thread cannot be spawned.
    pub fn search(&self, starting: &[Entity], depth: u32) -> BreedResult<SearchOutcome> {
        let _span = tracing::info_span!("search", starting = starting.len(), depth).entered();

        let mut state = SearchState::new(starting);
        if state.known.is_empty() {
            tracing::info!("no starting entities; nothing to search");
            return Ok(SearchOutcome::empty());
        }

        let mut rounds = 0;
        let mut stop_reason = StopReason::DepthReached;
        for round in 1..=depth {
            if self.is_cancelled() {
                stop_reason = StopReason::Cancelled;
                break;
            }

            let stats = self.run_round(&mut state)?;
            rounds = round;
            tracing::debug!(
                round,
                frontier = stats.frontier,
                proposals = stats.proposals,
                replaced = stats.replaced,
                discovered = stats.discovered,
                "round complete"
            );

            if stats.discovered == 0 {
                stop_reason = StopReason::FixedPoint;
                break;
            }
        }

        let derivations: BTreeMap<EntityKey, Derivation> = state
            .best
            .into_iter()
            .filter_map(|(key, graph)| {
                let entity = self.catalog.get(&key)?.clone();
                Some((key, Derivation { entity, graph }))
            })
            .collect();

        tracing::info!(
            rounds,
            stop_reason = %stop_reason,
            derived = derivations.len(),
            "search finished"
        );

        Ok(SearchOutcome {
            derivations,
            rounds,
            stop_reason,
        })
    }

    fn run_round(&self, state: &mut SearchState) -> BreedResult<RoundStats> {
        // Children found this round are not parents until the next one.
        let frontier = state.known.clone();
        let proposals = propose(
            ScanInput {
                frontier: &frontier,
                reachable: &state.reachable,
                table: &self.table,
                catalog: &self.catalog,
            },
            self.workers,
        )?;

        let mut stats = RoundStats {
            frontier: frontier.len(),
            proposals: proposals.len(),
            ..RoundStats::default()
        };
        for proposal in proposals {
            let p1 = &frontier[proposal.left].key;
            let p2 = &frontier[proposal.right].key;
            let child = proposal.child;

            let candidate = state.candidate(p1, p2, &child);
            if state.offer(candidate) {
                stats.replaced += 1;
            }

            if state.reachable.insert(child.clone()) {
                if let Some(entity) = self.catalog.get(&child) {
                    state.known.push(entity.clone());
                }
                stats.discovered += 1;
            }
        }
        Ok(stats)
    }
}
