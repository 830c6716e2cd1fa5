//! Error types for breedpath.
//!
//! All errors are strongly typed using thiserror. Ordinary search outcomes
//! (a pair with no known child, a merge suppressed to keep a graph acyclic,
//! a candidate that is not an improvement) are never represented here.

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors raised at the caller boundary, before a search starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown entity: '{selection}'")]
    UnknownEntity {
        selection: String,
    },

    #[error("Unknown ability '{name}' (expected one of: {expected})")]
    UnknownAbility {
        name: String,
        expected: String,
    },

    #[error("Starting selection is empty")]
    EmptySelection,

    #[error("Depth {depth} is out of range [1, {max}]")]
    DepthOutOfRange {
        depth: u32,
        max: u32,
    },

    #[error("Ability '{ability}' score {value} is out of range [0, 4]")]
    AbilityOutOfRange {
        ability: String,
        value: i64,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },
}

/// Errors that abort loading a whole data feed.
///
/// Individual malformed records never produce a `LoadError`; they are
/// skipped and listed in the loader's report instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {feed} feed at {}: {source}", path.display())]
    Io {
        feed: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {feed} feed: {message}")]
    Parse {
        feed: &'static str,
        message: String,
    },

    #[error("The {feed} feed must be a JSON array of records")]
    NotAnArray {
        feed: &'static str,
    },
}

/// Top-level error type for breedpath.
#[derive(Debug, Error)]
pub enum BreedError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl BreedError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// The caller-supplied identifier this error is about, if any.
    #[must_use]
    pub fn offending_identifier(&self) -> Option<&str> {
        match self {
            Self::Validation(ValidationError::UnknownEntity { selection }) => Some(selection),
            Self::Validation(ValidationError::UnknownAbility { name, .. }) => Some(name),
            Self::Validation(ValidationError::AbilityOutOfRange { ability, .. }) => Some(ability),
            _ => None,
        }
    }
}

/// Result type alias for breedpath operations.
pub type BreedResult<T> = Result<T, BreedError>;
