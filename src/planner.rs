//! Caller-facing entry point.
//!
//! The planner owns the loaded catalog, combination table and configuration,
//! validates user input (selections, depth) and only then hands resolved
//! entities to the [`SearchEngine`].

use std::path::Path;
use std::sync::Arc;

use crate::catalog::{load_combinations, load_entities, CombinationTable, EntityCatalog, LoadReport};
use crate::config::SearchConfig;
use crate::engine::{CancelToken, SearchEngine, SearchOutcome};
use crate::error::{BreedResult, ValidationError};

/// Validating front door to the search engine.
#[derive(Debug, Clone)]
pub struct Planner {
    engine: SearchEngine,
    config: SearchConfig,
}

impl Planner {
    /// Creates a planner over already loaded data.
    #[must_use]
    pub fn new(catalog: Arc<EntityCatalog>, table: Arc<CombinationTable>, config: SearchConfig) -> Self {
        let engine = SearchEngine::new(catalog, table).with_workers(config.workers);
        Self { engine, config }
    }

    /// Loads both feeds from JSON files and builds a planner.
    ///
    /// Returns the entity and combination load reports alongside.
    pub fn from_feeds(
        entities: impl AsRef<Path>,
        combinations: impl AsRef<Path>,
        config: SearchConfig,
    ) -> BreedResult<(Self, [LoadReport; 2])> {
        let (catalog, entity_report) = load_entities(entities)?;
        let (table, combination_report) = load_combinations(combinations)?;
        tracing::info!(
            entities = catalog.len(),
            combinations = table.len(),
            skipped_entities = entity_report.skipped.len(),
            skipped_combinations = combination_report.skipped.len(),
            "feeds loaded"
        );
        Ok((
            Self::new(Arc::new(catalog), Arc::new(table), config),
            [entity_report, combination_report],
        ))
    }

    /// Stops searches started by this planner when `token` is cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.engine = self.engine.with_cancel_token(token);
        self
    }

    /// The underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// The loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &EntityCatalog {
        self.engine.catalog()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Resolves `selections` (keys or names), validates `depth` (or uses the
    /// configured default) and runs the search.
    ///
    /// # Errors
    ///
    /// - `EmptySelection` when `selections` is empty
    /// - `UnknownEntity` naming the first selection not in the catalog
    /// - `DepthOutOfRange` when `depth` is 0 or above `max_depth`
    pub fn plan<S: AsRef<str>>(&self, selections: &[S], depth: Option<u32>) -> BreedResult<SearchOutcome> {
        if selections.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let starting = self.catalog().resolve_all(selections)?;
        let depth = self
            .config
            .validate_depth(depth.unwrap_or(self.config.default_depth))?;
        self.engine.search(&starting, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityKey};
    use crate::error::BreedError;

    fn planner() -> Planner {
        let catalog = EntityCatalog::from_entities([
            Entity::new("001", "Lamball", 1),
            Entity::new("002", "Cattiva", 1),
            Entity::new("003", "Chikipi", 1),
        ]);
        let table = CombinationTable::from_triples([("001", "002", "003")]);
        Planner::new(Arc::new(catalog), Arc::new(table), SearchConfig::default())
    }

    #[test]
    fn plan_resolves_names_and_uses_default_depth() {
        let outcome = planner().plan(&["lamball", "Cattiva"], None).unwrap();
        assert!(outcome.get(&EntityKey::from("003")).is_some());
    }

    #[test]
    fn plan_rejects_unknown_selection() {
        let err = planner().plan(&["Lamball", "Gorirat"], Some(2)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.offending_identifier(), Some("Gorirat"));
    }

    #[test]
    fn plan_rejects_bad_depth() {
        let err = planner().plan(&["Lamball"], Some(0)).unwrap_err();
        assert!(matches!(
            err,
            BreedError::Validation(ValidationError::DepthOutOfRange { depth: 0, .. })
        ));
        assert!(planner().plan(&["Lamball"], Some(99)).is_err());
    }

    #[test]
    fn plan_rejects_empty_selection() {
        let none: [&str; 0] = [];
        let err = planner().plan(&none, Some(1)).unwrap_err();
        assert!(matches!(err, BreedError::Validation(ValidationError::EmptySelection)));
    }
}
