use std::io::Write;
use std::sync::Arc;

use breedpath::{
    Ability, BreedError, CombinationTable, Entity, EntityCatalog, EntityKey, Planner,
    SearchConfig, SearchEngine, StopReason, ValidationError,
};

fn engine_with(keys: &[&str], triples: &[(&str, &str, &str)]) -> SearchEngine {
    let catalog =
        EntityCatalog::from_entities(keys.iter().map(|k| Entity::new(*k, k.to_uppercase(), 1)));
    let table = CombinationTable::from_triples(triples.iter().copied());
    SearchEngine::new(Arc::new(catalog), Arc::new(table))
}

fn entities(engine: &SearchEngine, keys: &[&str]) -> Vec<Entity> {
    keys.iter()
        .map(|k| engine.catalog().get(&EntityKey::from(*k)).unwrap().clone())
        .collect()
}

fn key(k: &str) -> EntityKey {
    EntityKey::from(k)
}

#[test]
fn single_pair_yields_one_step_graph() {
    let engine = engine_with(&["A", "B", "C"], &[("A", "B", "C")]);
    let outcome = engine.search(&entities(&engine, &["A", "B"]), 1).unwrap();

    assert_eq!(outcome.len(), 1);
    let c = outcome.get(&key("C")).unwrap();
    assert_eq!(c.graph.root(), &key("C"));
    assert!(c.graph.label(&key("A"), &key("C")).is_some());
    assert!(c.graph.label(&key("B"), &key("C")).is_some());
    assert_eq!(c.graph.edge_count(), 2);
    assert_eq!(c.graph.depth(), 1);
    assert_eq!(c.graph.unique_entity_count(), 3);
}

#[test]
fn second_generation_needs_second_round() {
    let table = [("A", "B", "C"), ("A", "C", "D")];
    let engine = engine_with(&["A", "B", "C", "D"], &table);
    let starting = entities(&engine, &["A", "B"]);

    let one = engine.search(&starting, 1).unwrap();
    assert!(one.get(&key("D")).is_none());
    assert!(one.get(&key("C")).is_some());

    let two = engine.search(&starting, 2).unwrap();
    let d = two.get(&key("D")).unwrap();
    for k in ["A", "B", "C", "D"] {
        assert!(d.graph.contains(&key(k)), "missing {k}");
    }
    assert_eq!(d.graph.depth(), 2);
}

#[test]
fn child_equal_to_parent_never_loops() {
    let engine = engine_with(&["A", "B"], &[("A", "B", "A")]);
    let outcome = engine.search(&entities(&engine, &["A", "B"]), 3).unwrap();

    assert_eq!(outcome.stop_reason(), StopReason::FixedPoint);
    assert_eq!(outcome.rounds(), 1);
    for d in outcome.iter() {
        assert!(d.graph.root_is_sink());
        assert!(d.graph.is_acyclic());
        assert!(d.graph.label(d.graph.root(), d.graph.root()).is_none());
    }
    let a = outcome.get(&key("A")).unwrap();
    assert_eq!(a.graph.edge_count(), 1);
}

#[test]
fn empty_start_returns_empty_outcome() {
    let engine = engine_with(&["A", "B", "C"], &[("A", "B", "C")]);
    let outcome = engine.search(&[], 5).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.rounds(), 0);
    assert_eq!(outcome.stop_reason(), StopReason::EmptyStart);
}

#[test]
fn leaner_graph_is_kept_on_depth_tie() {
    // F is offered by B x C in round 2 (depth 2, 4 entities) and again by
    // C x D in round 3 (depth 2, 5 entities); the first graph stays.
    let table = [
        ("A", "B", "C"),
        ("A", "C", "D"),
        ("C", "D", "F"),
        ("A", "D", "E"),
        ("B", "C", "F"),
    ];
    let engine = engine_with(&["A", "B", "C", "D", "E", "F"], &table);
    let outcome = engine.search(&entities(&engine, &["A", "B"]), 4).unwrap();

    let f = outcome.get(&key("F")).unwrap();
    assert_eq!(f.graph.depth(), 2);
    assert_eq!(f.graph.unique_entity_count(), 4);
    assert!(!f.graph.contains(&key("D")));
    let e = outcome.get(&key("E")).unwrap();
    assert_eq!(e.graph.depth(), 3);
}

#[test]
fn leaner_graph_replaces_wider_one_in_same_round() {
    // Round 2 offers G first via B x D (5 entities), then via X x D
    // (4 entities, same depth), which wins.
    let table = [("A", "X", "D"), ("B", "D", "G"), ("X", "D", "G")];
    let engine = engine_with(&["A", "B", "X", "D", "G"], &table);
    let outcome = engine.search(&entities(&engine, &["A", "B", "X"]), 2).unwrap();

    let g = outcome.get(&key("G")).unwrap();
    assert_eq!(g.graph.depth(), 2);
    assert_eq!(g.graph.unique_entity_count(), 4);
    assert!(!g.graph.contains(&key("B")));
    assert!(g.graph.label(&key("X"), &key("G")).is_some());
}

#[test]
fn graph_recorded_earlier_in_a_round_feeds_later_pairs() {
    // e3 x e0 -> e0 is recorded before e1 x e0 -> e2 in the same round, so
    // e2's graph already carries e0's step and is deeper than one round.
    let engine = engine_with(
        &["e0", "e1", "e2", "e3"],
        &[("e1", "e0", "e2"), ("e0", "e3", "e0")],
    );
    let outcome = engine.search(&entities(&engine, &["e3", "e1", "e0"]), 1).unwrap();

    assert_eq!(outcome.rounds(), 1);
    assert_eq!(outcome.stop_reason(), StopReason::DepthReached);
    let e2 = outcome.get(&key("e2")).unwrap();
    assert_eq!(e2.graph.depth(), 2);
    let edges: Vec<String> = e2
        .graph
        .edges()
        .map(|e| format!("{}->{}", e.parent, e.child))
        .collect();
    assert_eq!(edges, vec!["e0->e2", "e1->e2", "e3->e0"]);
    assert!(e2.graph.root_is_sink());
}

fn write_feed(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

fn pal(key: &str, name: &str, mining: i64) -> String {
    format!(
        r#"{{"key":"{key}","name":"{name}","rarity":1,"types":["Neutral"],
        "gathering":0,"generating_electricity":0,"handiwork":0,"kindling":0,"lumbering":0,
        "medicine_production":0,"mining":{mining},"planting":0,"transporting":0,"watering":0}}"#
    )
}

#[test]
fn planner_loads_feeds_and_skips_corrupt_rows() {
    let dir = tempfile::tempdir().unwrap();
    let pals = format!(
        "[{}, {}, {}, {}]",
        pal("001", "Lamball", 0),
        pal("002", "Cattiva", 1),
        pal("003", "Chikipi", 3),
        pal("004", "Broken", 11),
    );
    let entities = write_feed(&dir, "pals.json", &pals);
    let combinations = write_feed(
        &dir,
        "breeding.json",
        r#"[
            {"p1": "001", "p2": "002", "child": "003"},
            {"p1": "001", "child": "004"},
            {"p1": "002", "p2": "003", "child": "004"}
        ]"#,
    );

    let (planner, [entity_report, combination_report]) =
        Planner::from_feeds(&entities, &combinations, SearchConfig::default()).unwrap();
    assert_eq!(entity_report.loaded, 3);
    assert_eq!(entity_report.skipped[0].index, 3);
    assert_eq!(combination_report.loaded, 2);
    assert_eq!(combination_report.skipped[0].index, 1);

    let outcome = planner.plan(&["Lamball", "cattiva"], Some(3)).unwrap();
    let chikipi = outcome.get(&key("003")).unwrap();
    assert_eq!(chikipi.entity.ability(Ability::Mining), 3);
    // 002 x 003 -> 004 points at a creature dropped from the entity feed.
    assert!(outcome.get(&key("004")).is_none());
}

#[test]
fn planner_reports_missing_feed() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = Planner::from_feeds(&missing, &missing, SearchConfig::default()).unwrap_err();
    assert!(err.is_load());
    assert!(format!("{err}").contains("nope.json"));
}

#[test]
fn planner_names_unknown_selection() {
    let engine = engine_with(&["A", "B", "C"], &[("A", "B", "C")]);
    let planner = Planner::new(
        Arc::new(engine.catalog().clone()),
        Arc::new(engine.table().clone()),
        SearchConfig::default(),
    );
    match planner.plan(&["A", "Zed"], Some(1)) {
        Err(BreedError::Validation(ValidationError::UnknownEntity { selection })) => {
            assert_eq!(selection, "Zed");
        }
        other => panic!("expected UnknownEntity, got {other:?}"),
    }
}
