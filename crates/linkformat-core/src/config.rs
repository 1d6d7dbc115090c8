//! Codec configuration.
//!
//! The attribute classification tables and the strict-parsing switch are
//! plain data. An embedding application builds one [`LinkFormatConfig`]
//! (from defaults, code, or a JSON file) and hands it to the codec, which
//! treats it as an immutable snapshot for every call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use crate::model::attr;

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Read error: {0}")]
    Read(#[from] std::io::Error),

    /// The configuration document is not valid JSON for this schema.
    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// Attribute classification and parsing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkFormatConfig {
    /// Reject repeated single-occurrence attributes while parsing.
    pub strict: bool,

    /// Attributes whose values are carried as one space-joined string.
    pub space_separated: BTreeSet<String>,

    /// Attributes allowed at most once per entry under strict parsing.
    pub single_occurrence: BTreeSet<String>,
}

impl Default for LinkFormatConfig {
    fn default() -> Self {
        Self {
            strict: false,
            space_separated: [
                attr::RESOURCE_TYPE,
                attr::REVERSE_RELATION,
                attr::INTERFACE_DESCRIPTION,
                attr::RELATION,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            single_occurrence: [
                attr::ANCHOR,
                attr::RELATION,
                attr::REVERSE_RELATION,
                "media",
                attr::TITLE,
                "title*",
                "type",
                attr::MAX_SIZE_ESTIMATE,
                attr::OBSERVABLE,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl LinkFormatConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace the space-separated attribute set.
    pub fn with_space_separated<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.space_separated = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the single-occurrence attribute set.
    pub fn with_single_occurrence<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.single_occurrence = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_space_separated(&self, name: &str) -> bool {
        self.space_separated.contains(name)
    }

    pub fn is_single_occurrence(&self, name: &str) -> bool {
        self.single_occurrence.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let config = LinkFormatConfig::default();
        assert!(!config.strict);
        for name in ["rt", "rev", "if", "rel"] {
            assert!(config.is_space_separated(name), "{name}");
        }
        assert!(!config.is_space_separated("title"));
        assert!(config.is_single_occurrence("title"));
        assert!(config.is_single_occurrence("sz"));
        assert!(!config.is_single_occurrence("rt"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LinkFormatConfig::from_json_str(r#"{"strict": true}"#).unwrap();
        assert!(config.strict);
        assert_eq!(config.space_separated, LinkFormatConfig::default().space_separated);
    }

    #[test]
    fn test_json_overrides_tables() {
        let json = r#"{"spaceSeparated": ["rt", "x"], "singleOccurrence": []}"#;
        let config = LinkFormatConfig::from_json_str(json).unwrap();
        assert!(config.is_space_separated("x"));
        assert!(!config.is_space_separated("if"));
        assert!(!config.is_single_occurrence("title"));
    }

    #[test]
    fn test_invalid_json() {
        let err = LinkFormatConfig::from_json_str("{strict: yes}").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidData(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = LinkFormatConfig::from_json_file("/nonexistent/linkformat.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }

    #[test]
    fn test_builders() {
        let config = LinkFormatConfig::default()
            .with_strict(true)
            .with_space_separated(["a"])
            .with_single_occurrence(vec!["b".to_string()]);
        assert!(config.strict);
        assert!(config.is_space_separated("a"));
        assert!(!config.is_space_separated("rt"));
        assert!(config.is_single_occurrence("b"));
    }
}
