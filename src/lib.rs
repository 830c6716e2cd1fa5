//! # breedpath - generational breeding-path search
//!
//! Given a set of owned creatures and a number of breeding generations,
//! breedpath finds every creature reachable through repeated pairwise
//! breeding and, for each one, the best known derivation graph: the
//! shallowest one, then the one using the fewest distinct ancestors.
//!
//! ## Core Concepts
//!
//! - **Entity**: an immutable catalog creature identified by a unique key
//! - **CombinationTable**: unordered parent pair → child key
//! - **DerivationGraph**: acyclic record of the breeding steps producing a root
//! - **SearchEngine**: the generational expansion producing the best graphs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use breedpath::{Planner, SearchConfig, SortOrder, Ability};
//!
//! let (planner, _reports) =
//!     Planner::from_feeds("data/pals.json", "data/breeding.json", SearchConfig::default())?;
//! let outcome = planner.plan(&["Gorirat", "Chikipi"], Some(6))?;
//! for d in breedpath::report::sort_by_ability(&outcome, Ability::Mining, SortOrder::Descending) {
//!     println!("{} depth={} unique={}", d.entity, d.graph.depth(), d.graph.unique_entity_count());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data
pub mod catalog;
pub mod config;
pub mod entity;
pub mod error;

// Search
pub mod derivation;
pub mod engine;
pub mod planner;

// Caller-side helpers
pub mod registry;
pub mod render;
pub mod report;

// Re-export primary types at crate root for convenience
pub use catalog::{
    load_combinations, load_entities, parse_combinations, parse_entities, CombinationTable,
    EntityCatalog, LoadReport, ParentPair, SkippedRecord,
};
pub use config::SearchConfig;
pub use derivation::{compare, is_better, DerivationGraph, Edge, GraphMetrics};
pub use engine::{CancelToken, Derivation, SearchEngine, SearchOutcome, StopReason};
pub use entity::{Ability, AbilityScores, Entity, EntityKey};
pub use error::{BreedError, BreedResult, LoadError, ValidationError};
pub use planner::Planner;
pub use registry::{GraphHandle, GraphRegistry};
pub use report::{group_by_depth, sort_by_ability, sort_by_ability_name, DerivationReport, SortOrder};
