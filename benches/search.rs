use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use breedpath::{CombinationTable, Entity, EntityCatalog, EntityKey, SearchEngine};

const ENTITIES: usize = 120;

fn key(i: usize) -> EntityKey {
    EntityKey::new(format!("{i:03}"))
}

/// Builds a dense synthetic world where every pair has a child, spread over
/// the catalog with a cheap deterministic hash.
fn make_world() -> (Arc<EntityCatalog>, Arc<CombinationTable>) {
    let catalog = EntityCatalog::from_entities(
        (0..ENTITIES).map(|i| Entity::new(key(i), format!("Creature {i}"), (i % 10) as u32 + 1)),
    );
    let mut table = CombinationTable::new();
    for a in 0..ENTITIES {
        for b in (a + 1)..ENTITIES {
            let child = (a * 31 + b * 17 + 7) % ENTITIES;
            table.insert(key(a), key(b), key(child));
        }
    }
    (Arc::new(catalog), Arc::new(table))
}

fn bench_search(c: &mut Criterion) {
    let (catalog, table) = make_world();
    let starting: Vec<Entity> = (0..4)
        .filter_map(|i| catalog.get(&key(i)).cloned())
        .collect();

    let mut group = c.benchmark_group("search/depth3");
    group.throughput(Throughput::Elements(ENTITIES as u64));
    for workers in [1usize, 2, 4] {
        let engine = SearchEngine::new(Arc::clone(&catalog), Arc::clone(&table)).with_workers(workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &engine, |b, engine| {
            b.iter(|| engine.search(&starting, 3).unwrap());
        });
    }
    group.finish();
}

fn bench_merge_and_depth(c: &mut Criterion) {
    let (catalog, table) = make_world();
    let starting: Vec<Entity> = (0..6)
        .filter_map(|i| catalog.get(&key(i)).cloned())
        .collect();
    let engine = SearchEngine::new(catalog, table);
    let outcome = engine.search(&starting, 3).unwrap();
    let graphs: Vec<_> = outcome.iter().map(|d| d.graph.clone()).collect();

    c.bench_function("graph/merge_all", |b| {
        b.iter(|| {
            let mut acc = graphs[0].clone();
            for g in &graphs[1..] {
                acc.merge(g);
            }
            acc.depth()
        });
    });
}

criterion_group!(benches, bench_search, bench_merge_and_depth);
criterion_main!(benches);
