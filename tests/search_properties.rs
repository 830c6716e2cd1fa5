use std::cmp::Ordering;
use std::sync::Arc;

use breedpath::{
    compare, CombinationTable, DerivationGraph, Entity, EntityCatalog, EntityKey, SearchEngine,
    SearchOutcome,
};
use proptest::prelude::*;

const MAX_ENTITIES: usize = 8;
const MAX_COMBINATIONS: usize = 24;
const MAX_DEPTH: u32 = 5;

fn key(i: usize) -> EntityKey {
    EntityKey::new(format!("e{i}"))
}

/// A small random world: catalog size, combination triples (as indexes) and
/// the indexes of the starting entities.
fn world_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, usize)>, Vec<usize>)> {
    (2usize..=MAX_ENTITIES).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, 0..n), 0..=MAX_COMBINATIONS),
            prop::collection::vec(0..n, 0..=3),
        )
    })
}

fn engine_for(n: usize, triples: &[(usize, usize, usize)], workers: usize) -> SearchEngine {
    let catalog = EntityCatalog::from_entities((0..n).map(|i| Entity::new(key(i), format!("E{i}"), 1)));
    let mut table = CombinationTable::new();
    for &(a, b, c) in triples {
        table.insert(key(a), key(b), key(c));
    }
    SearchEngine::new(Arc::new(catalog), Arc::new(table)).with_workers(workers)
}

fn starting(engine: &SearchEngine, picks: &[usize]) -> Vec<Entity> {
    picks
        .iter()
        .map(|i| engine.catalog().get(&key(*i)).unwrap().clone())
        .collect()
}

fn fingerprints(outcome: &SearchOutcome) -> Vec<(EntityKey, String)> {
    outcome
        .iter()
        .map(|d| (d.entity.key.clone(), d.graph.fingerprint()))
        .collect()
}

fn graph_strategy() -> impl Strategy<Value = DerivationGraph> {
    prop::collection::vec((0usize..6, 0usize..6, 0usize..6), 0..8).prop_map(|steps| {
        let mut graph = DerivationGraph::new(key(0));
        for (a, b, c) in steps {
            graph.add_combination(&key(a), &key(b), &key(c));
        }
        graph
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn every_result_is_a_well_formed_graph(
        (n, triples, picks) in world_strategy(),
        depth in 0..=MAX_DEPTH,
    ) {
        let engine = engine_for(n, &triples, 1);
        let outcome = engine.search(&starting(&engine, &picks), depth).unwrap();
        prop_assert!(outcome.rounds() <= depth);
        for d in outcome.iter() {
            prop_assert_eq!(d.graph.root(), &d.entity.key);
            prop_assert!(d.graph.root_is_sink());
            prop_assert!(d.graph.unique_entity_count() >= 1);
            prop_assert!(d.graph.edge_count() >= 1);
            prop_assert!(d.graph.depth() >= 1);
        }
    }

    #[test]
    fn one_more_round_never_loses_or_worsens(
        (n, triples, picks) in world_strategy(),
        depth in 0..MAX_DEPTH,
    ) {
        let engine = engine_for(n, &triples, 1);
        let start = starting(&engine, &picks);
        let shallow = engine.search(&start, depth).unwrap();
        let deeper = engine.search(&start, depth + 1).unwrap();

        for d in shallow.iter() {
            let later = deeper.get(&d.entity.key);
            prop_assert!(later.is_some(), "{} lost at depth {}", d.entity.key, depth + 1);
            let later = later.unwrap();
            prop_assert_ne!(compare(&later.graph, &d.graph), Ordering::Greater);
        }
    }

    #[test]
    fn search_is_deterministic((n, triples, picks) in world_strategy(), depth in 0..=MAX_DEPTH) {
        let engine = engine_for(n, &triples, 1);
        let start = starting(&engine, &picks);
        let first = engine.search(&start, depth).unwrap();
        let second = engine.search(&start, depth).unwrap();
        prop_assert_eq!(fingerprints(&first), fingerprints(&second));
        prop_assert_eq!(first.stop_reason(), second.stop_reason());
    }

    #[test]
    fn parallel_scan_matches_inline(
        (n, triples, picks) in world_strategy(),
        depth in 0..=MAX_DEPTH,
        workers in 2usize..=4,
    ) {
        let inline = engine_for(n, &triples, 1);
        let parallel = engine_for(n, &triples, workers);
        let start = starting(&inline, &picks);
        let a = inline.search(&start, depth).unwrap();
        let b = parallel.search(&start, depth).unwrap();
        prop_assert_eq!(fingerprints(&a), fingerprints(&b));
        prop_assert_eq!(a.rounds(), b.rounds());
    }

    #[test]
    fn edgeless_graph_has_depth_zero(root in 0usize..MAX_ENTITIES) {
        let graph = DerivationGraph::new(key(root));
        prop_assert_eq!(graph.depth(), 0);
        prop_assert_eq!(graph.unique_entity_count(), 1);
    }

    #[test]
    fn comparator_is_a_total_preorder(
        a in graph_strategy(),
        b in graph_strategy(),
        c in graph_strategy(),
    ) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        prop_assert_eq!(compare(&a, &a), Ordering::Equal);
        if compare(&a, &b) != Ordering::Greater && compare(&b, &c) != Ordering::Greater {
            prop_assert_ne!(compare(&a, &c), Ordering::Greater);
        }
    }
}
