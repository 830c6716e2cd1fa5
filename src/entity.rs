//! Entity types and identity.
//!
//! An entity is an immutable catalog item (a creature) identified by a
//! unique string key. Graphs and the search engine only ever handle
//! [`EntityKey`]s; the full [`Entity`] record is looked up through the
//! catalog when needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unique, stable entity key (for example `"080"`).
///
/// # Examples
///
/// ```
/// use breedpath::EntityKey;
///
/// let key = EntityKey::new("080");
/// assert_eq!(key.as_str(), "080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Creates a key from any string-like value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// The fixed set of work abilities every entity is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Gathering,
    GeneratingElectricity,
    Handiwork,
    Kindling,
    Lumbering,
    MedicineProduction,
    Mining,
    Planting,
    Transporting,
    Watering,
}

impl Ability {
    /// All abilities, in feed column order.
    pub const ALL: [Self; 10] = [
        Self::Gathering,
        Self::GeneratingElectricity,
        Self::Handiwork,
        Self::Kindling,
        Self::Lumbering,
        Self::MedicineProduction,
        Self::Mining,
        Self::Planting,
        Self::Transporting,
        Self::Watering,
    ];

    /// Highest score an ability may carry.
    pub const MAX_SCORE: u8 = 4;

    /// Returns the feed column name of this ability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gathering => "gathering",
            Self::GeneratingElectricity => "generating_electricity",
            Self::Handiwork => "handiwork",
            Self::Kindling => "kindling",
            Self::Lumbering => "lumbering",
            Self::MedicineProduction => "medicine_production",
            Self::Mining => "mining",
            Self::Planting => "planting",
            Self::Transporting => "transporting",
            Self::Watering => "watering",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    fn expected_names() -> String {
        Self::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownAbility {
                name: s.to_string(),
                expected: Self::expected_names(),
            })
    }
}

/// Ten ability scores, each in `[0, 4]`.
///
/// Deserializes from an array of ten integers in feed column order; any value
/// outside `[0, 4]` is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 10]")]
pub struct AbilityScores([u8; 10]);

impl AbilityScores {
    /// Builds scores from raw feed values, rejecting anything outside `[0, 4]`.
    pub fn try_from_values(values: [(Ability, i64); 10]) -> Result<Self, ValidationError> {
        let mut scores = [0u8; 10];
        for (ability, value) in values {
            scores[ability.index()] = checked_score(ability, value)?;
        }
        Ok(Self(scores))
    }

    /// Returns the score for one ability.
    #[must_use]
    pub const fn get(&self, ability: Ability) -> u8 {
        self.0[ability.index()]
    }

    /// Returns a copy with one ability changed.
    pub fn with(mut self, ability: Ability, value: i64) -> Result<Self, ValidationError> {
        self.0[ability.index()] = checked_score(ability, value)?;
        Ok(self)
    }

    /// Iterates `(ability, score)` pairs in feed column order.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, u8)> + '_ {
        Ability::ALL.into_iter().map(|a| (a, self.get(a)))
    }
}

impl TryFrom<[i64; 10]> for AbilityScores {
    type Error = ValidationError;

    fn try_from(values: [i64; 10]) -> Result<Self, Self::Error> {
        Self::try_from_values(std::array::from_fn(|i| (Ability::ALL[i], values[i])))
    }
}

fn checked_score(ability: Ability, value: i64) -> Result<u8, ValidationError> {
    match u8::try_from(value) {
        Ok(v) if v <= Ability::MAX_SCORE => Ok(v),
        _ => Err(ValidationError::AbilityOutOfRange {
            ability: ability.as_str().to_string(),
            value,
        }),
    }
}

/// An immutable catalog entity.
///
/// Equality and hashing use the key only: two records with the same key are
/// the same entity.
///
/// # Examples
///
/// ```
/// use breedpath::{Ability, Entity};
///
/// let pal = Entity::new("001", "Lamball", 1);
/// assert_eq!(pal.ability(Ability::Mining), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique catalog key.
    pub key: EntityKey,

    /// Display name.
    pub name: String,

    /// Rarity tier (higher is rarer).
    pub rarity: u32,

    /// Category tags, e.g. elemental types.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Work-ability scores.
    pub abilities: AbilityScores,
}

impl Entity {
    /// Creates an entity with no tags and all abilities at zero.
    #[must_use]
    pub fn new(key: impl Into<EntityKey>, name: impl Into<String>, rarity: u32) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            rarity,
            tags: Vec::new(),
            abilities: AbilityScores::default(),
        }
    }

    /// Sets the category tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ability scores.
    #[must_use]
    pub const fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    /// Returns this entity's score for `ability`.
    #[must_use]
    pub const fn ability(&self, ability: Ability) -> u8 {
        self.abilities.get(ability)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.key)
    }
}
