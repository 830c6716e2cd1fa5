//! Search configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, ValidationError};

/// Tunables for a search.
///
/// Any subset of fields may be given in a JSON config file; the rest keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest depth a caller may request.
    pub max_depth: u32,
    /// Depth used when the caller does not pick one.
    pub default_depth: u32,
    /// Threads used for the per-round pair scan. 1 scans inline.
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            default_depth: 3,
            workers: 1,
        }
    }
}

impl SearchConfig {
    /// Reads a config file, falling back to defaults for absent fields.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            feed: "config",
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| LoadError::Parse {
            feed: "config",
            message: e.to_string(),
        })
    }

    /// Checks that `depth` lies in `[1, max_depth]`.
    pub fn validate_depth(&self, depth: u32) -> Result<u32, ValidationError> {
        if depth == 0 || depth > self.max_depth {
            return Err(ValidationError::DepthOutOfRange {
                depth,
                max: self.max_depth,
            });
        }
        Ok(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"workers": 4}"#).unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.max_depth, 8);
        assert_eq!(cfg.default_depth, 3);
    }

    #[test]
    fn depth_bounds() {
        let cfg = SearchConfig::default();
        assert!(cfg.validate_depth(0).is_err());
        assert_eq!(cfg.validate_depth(1).unwrap(), 1);
        assert_eq!(cfg.validate_depth(8).unwrap(), 8);
        let err = cfg.validate_depth(9).unwrap_err();
        assert!(matches!(err, ValidationError::DepthOutOfRange { depth: 9, max: 8 }));
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = SearchConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { feed: "config", .. }));
    }
}
