//! Derivation graphs.
//!
//! A derivation graph records, for one target entity (the root), every
//! combination step that contributes to producing it. Nodes are entity keys;
//! each edge points from a parent to the child it helped produce and carries
//! the unordered parent pair of that step as its label.
//!
//! Graphs are kept acyclic by their callers: the engine only merges a parent's
//! graph into a candidate when that graph does not already contain the
//! candidate's root.

mod compare;

pub use compare::{compare, is_better, GraphMetrics};

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::Serialize;

use crate::catalog::ParentPair;
use crate::entity::EntityKey;

/// One labelled parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// The contributing parent.
    pub parent: EntityKey,
    /// The entity produced.
    pub child: EntityKey,
    /// The parent pair of the combination step.
    pub label: ParentPair,
}

/// Directed acyclic record of how a root entity is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationGraph {
    root: EntityKey,
    nodes: BTreeSet<EntityKey>,
    edges: BTreeMap<(EntityKey, EntityKey), ParentPair>,
}

impl DerivationGraph {
    /// Creates a graph holding only `root`.
    #[must_use]
    pub fn new(root: EntityKey) -> Self {
        let mut nodes = BTreeSet::new();
        nodes.insert(root.clone());
        Self {
            root,
            nodes,
            edges: BTreeMap::new(),
        }
    }

    /// The target entity of this graph.
    #[must_use]
    pub const fn root(&self) -> &EntityKey {
        &self.root
    }

    /// Records that combining `p1` and `p2` produces `child`.
    ///
    /// Adds the edges `p1 → child` and `p2 → child`, both labelled with the
    /// pair `{p1, p2}`. A parent equal to the child gets no edge, so a
    /// combination that reproduces one of its parents never adds a self-loop.
    /// An edge that already exists takes the new label.
    pub fn add_combination(&mut self, p1: &EntityKey, p2: &EntityKey, child: &EntityKey) {
        let label = ParentPair::new(p1.clone(), p2.clone());
        for node in [p1, p2, child] {
            self.nodes.insert(node.clone());
        }
        for parent in [p1, p2] {
            if parent != child {
                self.edges
                    .insert((parent.clone(), child.clone()), label.clone());
            }
        }
    }

    /// Unions `other` into this graph.
    ///
    /// The root is kept. Where both graphs hold the same edge, the label from
    /// `other` wins, so `a.merge(b)` and `b.merge(a)` may differ in labels.
    pub fn merge(&mut self, other: &Self) {
        self.nodes.extend(other.nodes.iter().cloned());
        for (key, label) in &other.edges {
            self.edges.insert(key.clone(), label.clone());
        }
    }

    /// Longest of the shortest paths from any node to the root.
    ///
    /// Nodes without a path to the root are ignored. A graph without edges
    /// has depth 0. This can be smaller than the longest path in the graph.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.edges.is_empty() {
            return 0;
        }

        let mut parents_of: HashMap<&EntityKey, Vec<&EntityKey>> = HashMap::new();
        for (parent, child) in self.edges.keys() {
            parents_of.entry(child).or_default().push(parent);
        }

        let mut dist: HashMap<&EntityKey, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(&self.root, 0);
        queue.push_back(&self.root);

        let mut deepest = 0;
        while let Some(node) = queue.pop_front() {
            let d = dist[node];
            deepest = deepest.max(d);
            for &parent in parents_of.get(node).map(Vec::as_slice).unwrap_or_default() {
                if !dist.contains_key(parent) {
                    dist.insert(parent, d + 1);
                    queue.push_back(parent);
                }
            }
        }
        deepest
    }

    /// Number of distinct entities in the graph, root included.
    #[must_use]
    pub fn unique_entity_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if `key` is a node of this graph.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.nodes.contains(key)
    }

    /// Depth and unique-entity count, the inputs to graph comparison.
    #[must_use]
    pub fn metrics(&self) -> GraphMetrics {
        GraphMetrics {
            depth: self.depth(),
            unique_entities: self.unique_entity_count(),
        }
    }

    /// Nodes in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &EntityKey> {
        self.nodes.iter()
    }

    /// Edges in `(parent, child)` order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|((parent, child), label)| Edge {
            parent: parent.clone(),
            child: child.clone(),
            label: label.clone(),
        })
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Label of the `parent → child` edge, if present.
    #[must_use]
    pub fn label(&self, parent: &EntityKey, child: &EntityKey) -> Option<&ParentPair> {
        self.edges.get(&(parent.clone(), child.clone()))
    }

    /// Returns true if the root has no outgoing edge, i.e. it is never its
    /// own ancestor.
    #[must_use]
    pub fn root_is_sink(&self) -> bool {
        !self.edges.keys().any(|(parent, _)| parent == &self.root)
    }

    /// Returns true if the graph has no directed cycle.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        let mut indegree: HashMap<&EntityKey, usize> = self.nodes.iter().map(|n| (n, 0)).collect();
        let mut children_of: HashMap<&EntityKey, Vec<&EntityKey>> = HashMap::new();
        for (parent, child) in self.edges.keys() {
            *indegree.entry(child).or_default() += 1;
            children_of.entry(parent).or_default().push(child);
        }

        let mut ready: Vec<&EntityKey> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut visited = 0;
        while let Some(node) = ready.pop() {
            visited += 1;
            for &child in children_of.get(node).map(Vec::as_slice).unwrap_or_default() {
                if let Some(d) = indegree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(child);
                    }
                }
            }
        }
        visited == indegree.len()
    }

    /// Stable blake3 digest of the root, nodes and labelled edges.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fn put(hasher: &mut blake3::Hasher, key: &EntityKey) {
            let bytes = key.as_str().as_bytes();
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }

        let mut hasher = blake3::Hasher::new();
        put(&mut hasher, &self.root);
        hasher.update(&(self.nodes.len() as u64).to_le_bytes());
        for node in &self.nodes {
            put(&mut hasher, node);
        }
        hasher.update(&(self.edges.len() as u64).to_le_bytes());
        for ((parent, child), label) in &self.edges {
            put(&mut hasher, parent);
            put(&mut hasher, child);
            put(&mut hasher, label.first());
            put(&mut hasher, label.second());
        }
        hasher.finalize().to_hex().to_string()
    }
}
