//! Configuration - loader policy and registry limits

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Regional source letter preferred when picking among IDS candidates.
    ///
    /// G China, H Hong Kong, J Japan, K ROK, M Macau, P DPRK, S SAT,
    /// T Taiwan, U Unicode, B UK, V Vietnam.
    #[serde(default = "default_preferred_variant")]
    pub preferred_variant: char,
    /// `J` keeps Japanese-only definitions, `C` keeps Cantonese-only ones.
    #[serde(default)]
    pub definition_dialect: Option<char>,
    /// Recipes containing any of these stand for unknown components and are not registered.
    #[serde(default = "default_unknown_markers")]
    pub unknown_markers: Vec<char>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_preferred_variant() -> char {
    'U'
}

fn default_unknown_markers() -> Vec<char> {
    vec!['？', '{']
}

fn default_max_depth() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferred_variant: default_preferred_variant(),
            definition_dialect: None,
            unknown_markers: default_unknown_markers(),
            max_depth: default_max_depth(),
        }
    }
}

impl Config {
    /// Read a JSON config. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.preferred_variant, 'U');
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"preferredVariant": "T", "definitionDialect": "J"}}"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.preferred_variant, 'T');
        assert_eq!(config.definition_dialect, Some('J'));
        assert_eq!(config.unknown_markers, vec!['？', '{']);
        assert_eq!(config.max_depth, 256);
    }

    #[test]
    fn test_invalid_config_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
