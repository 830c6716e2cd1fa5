//! Entity catalog, combination table and their feed loaders.
//!
//! Both structures are built once, before any search, and are read-only
//! afterwards. They can be shared between concurrent searches behind an
//! `Arc` without further synchronization.
//!
//! Feeds are JSON arrays. Every record is decoded on its own: a malformed
//! record is skipped, logged, and listed in the [`LoadReport`] so that one
//! bad row never aborts a whole load.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::{Ability, AbilityScores, Entity, EntityKey};
use crate::error::{LoadError, ValidationError};

/// Immutable set of entities keyed by [`EntityKey`].
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    by_key: HashMap<EntityKey, Entity>,
    by_name: HashMap<String, EntityKey>,
    order: Vec<EntityKey>,
}

impl EntityCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from entities. A repeated key replaces the earlier entry.
    #[must_use]
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut catalog = Self::new();
        for entity in entities {
            catalog.insert(entity);
        }
        catalog
    }

    /// Inserts an entity, returning true if its key was new.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let key = entity.key.clone();
        let is_new = match self.by_key.insert(key.clone(), entity.clone()) {
            Some(previous) => {
                let stale = normalize_name(&previous.name);
                if self.by_name.get(&stale) == Some(&key) {
                    self.by_name.remove(&stale);
                }
                false
            }
            None => {
                self.order.push(key.clone());
                true
            }
        };
        self.by_name.insert(normalize_name(&entity.name), key);
        is_new
    }

    /// Looks up an entity by key.
    #[must_use]
    pub fn get(&self, key: &EntityKey) -> Option<&Entity> {
        self.by_key.get(key)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Looks up an entity by display name, ignoring case.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Entity> {
        self.by_name
            .get(&normalize_name(name))
            .and_then(|key| self.by_key.get(key))
    }

    /// Resolves a user selection given either as a key or as a display name.
    pub fn resolve(&self, selection: &str) -> Result<&Entity, ValidationError> {
        let trimmed = selection.trim();
        self.by_key
            .get(&EntityKey::from(trimmed))
            .or_else(|| self.by_name(trimmed))
            .ok_or_else(|| ValidationError::UnknownEntity {
                selection: trimmed.to_string(),
            })
    }

    /// Resolves every selection, failing on the first unknown one.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        selections: &[S],
    ) -> Result<Vec<Entity>, ValidationError> {
        selections
            .iter()
            .map(|s| self.resolve(s.as_ref()).cloned())
            .collect()
    }

    /// Autocompletes a display name.
    ///
    /// Prefix matches come first, then substring matches, both in feed order.
    #[must_use]
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<&str> {
        let query = normalize_name(query);
        let names: Vec<&str> = self
            .order
            .iter()
            .filter_map(|key| self.by_key.get(key))
            .map(|e| e.name.as_str())
            .collect();

        let prefix = names
            .iter()
            .copied()
            .filter(|n| n.to_lowercase().starts_with(&query));
        let contains = names.iter().copied().filter(|n| {
            let lower = n.to_lowercase();
            !lower.starts_with(&query) && lower.contains(&query)
        });
        prefix.chain(contains).take(limit).collect()
    }

    /// Iterates entities in feed order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|key| self.by_key.get(key))
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An unordered pair of parent keys, stored sorted.
///
/// Deserialized pairs are normalized the same way as [`ParentPair::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawPair")]
pub struct ParentPair {
    first: EntityKey,
    second: EntityKey,
}

#[derive(Deserialize)]
struct RawPair {
    first: EntityKey,
    second: EntityKey,
}

impl From<RawPair> for ParentPair {
    fn from(raw: RawPair) -> Self {
        Self::new(raw.first, raw.second)
    }
}

impl ParentPair {
    /// Normalizes the two keys so that argument order never matters.
    #[must_use]
    pub fn new(a: EntityKey, b: EntityKey) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The lexicographically smaller key.
    #[must_use]
    pub const fn first(&self) -> &EntityKey {
        &self.first
    }

    /// The lexicographically larger key.
    #[must_use]
    pub const fn second(&self) -> &EntityKey {
        &self.second
    }

    /// Returns true if `key` is one of the two parents.
    #[must_use]
    pub fn includes(&self, key: &EntityKey) -> bool {
        &self.first == key || &self.second == key
    }
}

/// Immutable mapping from an unordered parent pair to the child key.
#[derive(Debug, Clone, Default)]
pub struct CombinationTable {
    children: HashMap<ParentPair, EntityKey>,
}

impl CombinationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(parent, parent, child)` triples.
    #[must_use]
    pub fn from_triples<K: Into<EntityKey>>(triples: impl IntoIterator<Item = (K, K, K)>) -> Self {
        let mut table = Self::new();
        for (a, b, child) in triples {
            table.insert(a.into(), b.into(), child.into());
        }
        table
    }

    /// Records a combination. Returns the child previously stored for the pair.
    pub fn insert(&mut self, a: EntityKey, b: EntityKey, child: EntityKey) -> Option<EntityKey> {
        self.children.insert(ParentPair::new(a, b), child)
    }

    /// Child produced by combining `a` and `b`, in either order.
    #[must_use]
    pub fn lookup(&self, a: &EntityKey, b: &EntityKey) -> Option<&EntityKey> {
        self.children.get(&ParentPair::new(a.clone(), b.clone()))
    }

    /// Number of known combinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if no combination is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A feed record that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position of the record in the feed array.
    pub index: usize,
    /// Why it was skipped.
    pub reason: String,
}

/// Load diagnostics for one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Feed name (`entity` or `combination`).
    pub feed: &'static str,
    /// Records accepted.
    pub loaded: usize,
    /// Records skipped, in feed order.
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    fn new(feed: &'static str) -> Self {
        Self {
            feed,
            loaded: 0,
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, index: usize, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(feed = self.feed, index, reason = %reason, "skipping feed record");
        self.skipped.push(SkippedRecord { index, reason });
    }

    /// Returns true if every record was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagRecord {
    Name(String),
    Object { name: String },
}

impl TagRecord {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityRecord {
    key: String,
    name: String,
    rarity: u32,
    #[serde(default)]
    types: Vec<TagRecord>,
    gathering: i64,
    generating_electricity: i64,
    handiwork: i64,
    kindling: i64,
    lumbering: i64,
    medicine_production: i64,
    mining: i64,
    planting: i64,
    transporting: i64,
    watering: i64,
}

impl EntityRecord {
    fn into_entity(self) -> Result<Entity, ValidationError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "key".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
            });
        }
        let abilities = AbilityScores::try_from_values([
            (Ability::Gathering, self.gathering),
            (Ability::GeneratingElectricity, self.generating_electricity),
            (Ability::Handiwork, self.handiwork),
            (Ability::Kindling, self.kindling),
            (Ability::Lumbering, self.lumbering),
            (Ability::MedicineProduction, self.medicine_production),
            (Ability::Mining, self.mining),
            (Ability::Planting, self.planting),
            (Ability::Transporting, self.transporting),
            (Ability::Watering, self.watering),
        ])?;
        Ok(Entity::new(self.key.trim(), self.name.trim(), self.rarity)
            .with_tags(self.types.into_iter().map(TagRecord::into_name))
            .with_abilities(abilities))
    }
}

#[derive(Debug, Deserialize)]
struct CombinationRecord {
    p1: String,
    p2: String,
    #[serde(alias = "child_id")]
    child: String,
}

fn read_feed(feed: &'static str, path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        feed,
        path: path.to_path_buf(),
        source,
    })
}

fn parse_array(feed: &'static str, json: &str) -> Result<Vec<serde_json::Value>, LoadError> {
    let doc: serde_json::Value = serde_json::from_str(json).map_err(|e| LoadError::Parse {
        feed,
        message: e.to_string(),
    })?;
    match doc {
        serde_json::Value::Array(records) => Ok(records),
        _ => Err(LoadError::NotAnArray { feed }),
    }
}

/// Parses an entity feed from JSON text.
pub fn parse_entities(json: &str) -> Result<(EntityCatalog, LoadReport), LoadError> {
    const FEED: &str = "entity";
    let records = parse_array(FEED, json)?;
    let mut report = LoadReport::new(FEED);
    let mut catalog = EntityCatalog::new();

    for (index, value) in records.into_iter().enumerate() {
        let record: EntityRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                report.skip(index, e.to_string());
                continue;
            }
        };
        let entity = match record.into_entity() {
            Ok(entity) => entity,
            Err(e) => {
                report.skip(index, e.to_string());
                continue;
            }
        };
        if catalog.contains(&entity.key) {
            report.skip(index, format!("duplicate entity key '{}'", entity.key));
            continue;
        }
        catalog.insert(entity);
        report.loaded += 1;
    }

    Ok((catalog, report))
}

/// Parses a combination feed from JSON text.
pub fn parse_combinations(json: &str) -> Result<(CombinationTable, LoadReport), LoadError> {
    const FEED: &str = "combination";
    let records = parse_array(FEED, json)?;
    let mut report = LoadReport::new(FEED);
    let mut table = CombinationTable::new();

    for (index, value) in records.into_iter().enumerate() {
        let record: CombinationRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                report.skip(index, e.to_string());
                continue;
            }
        };
        let missing = [("p1", &record.p1), ("p2", &record.p2), ("child", &record.child)]
            .into_iter()
            .find(|(_, v)| v.trim().is_empty());
        if let Some((field, _)) = missing {
            report.skip(
                index,
                ValidationError::MissingField {
                    field: field.to_string(),
                }
                .to_string(),
            );
            continue;
        }
        table.insert(
            EntityKey::from(record.p1.trim()),
            EntityKey::from(record.p2.trim()),
            EntityKey::from(record.child.trim()),
        );
        report.loaded += 1;
    }

    Ok((table, report))
}

/// Loads an entity feed from a JSON file.
pub fn load_entities(path: impl AsRef<Path>) -> Result<(EntityCatalog, LoadReport), LoadError> {
    parse_entities(&read_feed("entity", path.as_ref())?)
}

/// Loads a combination feed from a JSON file.
pub fn load_combinations(
    path: impl AsRef<Path>,
) -> Result<(CombinationTable, LoadReport), LoadError> {
    parse_combinations(&read_feed("combination", path.as_ref())?)
}
