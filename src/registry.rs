//! Handle → graph registry.
//!
//! Front ends that render graphs on demand keep search results here under
//! opaque handles. The registry is thread-safe; entries live until the caller
//! evicts them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::derivation::DerivationGraph;
use crate::error::{BreedError, BreedResult};

/// Opaque handle to a registered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphHandle(Uuid);

impl GraphHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GraphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GraphHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug)]
struct Entry {
    graph: Arc<DerivationGraph>,
    registered_at: DateTime<Utc>,
}

fn lock_err(context: &'static str) -> BreedError {
    BreedError::internal(format!("poisoned lock: {context}"))
}

/// Thread-safe store of graphs keyed by [`GraphHandle`].
#[derive(Debug, Default)]
pub struct GraphRegistry {
    entries: RwLock<HashMap<GraphHandle, Entry>>,
}

impl GraphRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `graph` and returns its new handle.
    pub fn register(&self, graph: DerivationGraph) -> BreedResult<GraphHandle> {
        self.register_at(graph, Utc::now())
    }

    fn register_at(&self, graph: DerivationGraph, now: DateTime<Utc>) -> BreedResult<GraphHandle> {
        let handle = GraphHandle::new();
        let mut entries = self.entries.write().map_err(|_| lock_err("register"))?;
        entries.insert(
            handle,
            Entry {
                graph: Arc::new(graph),
                registered_at: now,
            },
        );
        Ok(handle)
    }

    /// Looks up a graph.
    pub fn get(&self, handle: GraphHandle) -> BreedResult<Option<Arc<DerivationGraph>>> {
        let entries = self.entries.read().map_err(|_| lock_err("get"))?;
        Ok(entries.get(&handle).map(|e| Arc::clone(&e.graph)))
    }

    /// Removes one graph, returning it if it was present.
    pub fn evict(&self, handle: GraphHandle) -> BreedResult<Option<Arc<DerivationGraph>>> {
        let mut entries = self.entries.write().map_err(|_| lock_err("evict"))?;
        Ok(entries.remove(&handle).map(|e| e.graph))
    }

    /// Removes every graph registered more than `age` ago. Returns how many.
    pub fn evict_older_than(&self, age: Duration) -> BreedResult<usize> {
        self.evict_registered_before(Utc::now() - age)
    }

    fn evict_registered_before(&self, cutoff: DateTime<Utc>) -> BreedResult<usize> {
        let mut entries = self.entries.write().map_err(|_| lock_err("evict_older_than"))?;
        let before = entries.len();
        entries.retain(|_, e| e.registered_at >= cutoff);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = entries.len(), "evicted expired graphs");
        }
        Ok(evicted)
    }

    /// Number of stored graphs.
    pub fn len(&self) -> BreedResult<usize> {
        Ok(self.entries.read().map_err(|_| lock_err("len"))?.len())
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> BreedResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKey;

    fn graph(root: &str) -> DerivationGraph {
        DerivationGraph::new(EntityKey::from(root))
    }

    #[test]
    fn register_get_evict() {
        let registry = GraphRegistry::new();
        let handle = registry.register(graph("c")).unwrap();
        assert_eq!(registry.len().unwrap(), 1);
        assert_eq!(registry.get(handle).unwrap().unwrap().root().as_str(), "c");

        let evicted = registry.evict(handle).unwrap().unwrap();
        assert_eq!(evicted.root().as_str(), "c");
        assert!(registry.get(handle).unwrap().is_none());
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn handles_are_distinct_and_parse() {
        let registry = GraphRegistry::new();
        let a = registry.register(graph("a")).unwrap();
        let b = registry.register(graph("a")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<GraphHandle>().unwrap(), a);
        assert!("not-a-handle".parse::<GraphHandle>().is_err());
    }

    #[test]
    fn evicts_only_expired_entries() {
        let registry = GraphRegistry::new();
        let now = Utc::now();
        let old = registry.register_at(graph("old"), now - Duration::hours(2)).unwrap();
        let fresh = registry.register_at(graph("fresh"), now).unwrap();

        let evicted = registry.evict_registered_before(now - Duration::hours(1)).unwrap();
        assert_eq!(evicted, 1);
        assert!(registry.get(old).unwrap().is_none());
        assert!(registry.get(fresh).unwrap().is_some());
    }

    #[test]
    fn shared_across_threads() {
        let registry = Arc::new(GraphRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.register(graph(&format!("g{i}"))).unwrap())
            })
            .collect();
        for h in handles {
            let handle = h.join().unwrap();
            assert!(registry.get(handle).unwrap().is_some());
        }
        assert_eq!(registry.len().unwrap(), 4);
    }
}
