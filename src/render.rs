//! Graphviz export.
//!
//! Turning a graph into a picture is left to an external renderer; this module
//! produces the DOT text such a renderer consumes.

use std::fmt;

use crate::catalog::{EntityCatalog, ParentPair};
use crate::derivation::DerivationGraph;
use crate::entity::EntityKey;

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn display_name<'a>(catalog: &'a EntityCatalog, key: &'a EntityKey) -> &'a str {
    catalog.get(key).map_or(key.as_str(), |e| e.name.as_str())
}

fn pair_label(catalog: &EntityCatalog, pair: &ParentPair) -> String {
    format!(
        "{} x {}",
        display_name(catalog, pair.first()),
        display_name(catalog, pair.second())
    )
}

/// A graph paired with the catalog used to name its nodes.
struct Dot<'a> {
    graph: &'a DerivationGraph,
    catalog: &'a EntityCatalog,
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { graph, catalog } = self;
        let title = dot_escape(display_name(catalog, graph.root()));
        writeln!(f, "digraph breeding {{")?;
        writeln!(f, "  label=\"Breeding Graph: {title}\";")?;
        writeln!(f, "  labelloc=t;")?;
        writeln!(
            f,
            "  node [shape=ellipse, style=filled, fillcolor=\"#EAF2FF\", fontname=\"Helvetica\"];"
        )?;
        writeln!(f, "  edge [fontname=\"Helvetica\", fontsize=8];")?;
        writeln!(f)?;

        for node in graph.nodes() {
            let name = dot_escape(display_name(catalog, node));
            let id = dot_escape(node.as_str());
            if node == graph.root() {
                writeln!(f, "  \"{id}\" [label=\"{name}\", penwidth=2];")?;
            } else {
                writeln!(f, "  \"{id}\" [label=\"{name}\"];")?;
            }
        }
        writeln!(f)?;
        for edge in graph.edges() {
            writeln!(
                f,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                dot_escape(edge.parent.as_str()),
                dot_escape(edge.child.as_str()),
                dot_escape(&pair_label(catalog, &edge.label))
            )?;
        }
        writeln!(f, "}}")
    }
}

/// Renders `graph` as a DOT digraph, labelling nodes with display names.
#[must_use]
pub fn to_dot(graph: &DerivationGraph, catalog: &EntityCatalog) -> String {
    Dot { graph, catalog }.to_string()
}
