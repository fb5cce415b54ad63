//! Analyzer configuration.
//!
//! Every field has a default, so an empty object (or no file at all) gives the
//! pycparser conventions. Unknown keys are rejected so typos surface early.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::syntax::DEFAULT_DISCRIMINATOR;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// key holding each node's kind
    pub discriminator: String,
    /// placeholder for names and types the document does not provide
    pub sentinel: String,
    /// node kinds that open a function record
    pub function_kinds: Vec<String>,
    /// node kinds counted as conditionals
    pub conditional_kinds: Vec<String>,
    /// how many `type` links type resolution follows before giving up
    pub max_type_depth: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config at JSON path {path}: {message}")]
    Deserialize { path: String, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            discriminator: DEFAULT_DISCRIMINATOR.to_string(),
            sentinel: "unknown".to_string(),
            function_kinds: vec!["FuncDef".to_string()],
            conditional_kinds: vec!["If".to_string()],
            max_type_depth: 8,
        }
    }
}

impl AnalyzerConfig {
    /// Deserialize with JSON-path context in error messages, then validate.
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let config = match serde_path_to_error::deserialize::<_, AnalyzerConfig>(de) {
            Ok(config) => config,
            Err(err) => {
                let path = err.path().to_string();
                return Err(ConfigError::Deserialize { path, message: err.into_inner().to_string() });
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discriminator.is_empty() {
            return Err(ConfigError::Invalid("`discriminator` must not be empty".to_string()));
        }
        if self.function_kinds.is_empty() {
            return Err(ConfigError::Invalid("`function_kinds` must name at least one kind".to_string()));
        }
        Ok(())
    }

    pub fn is_function(&self, kind: &str) -> bool {
        self.function_kinds.iter().any(|k| k == kind)
    }

    pub fn is_conditional(&self, kind: &str) -> bool {
        self.conditional_kinds.iter().any(|k| k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(AnalyzerConfig::from_json_str("{}").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = AnalyzerConfig::from_json_str(r#"{"sentinel": "?", "conditional_kinds": ["If", "TernaryOp"]}"#)
            .unwrap();
        assert_eq!(config.sentinel, "?");
        assert!(config.is_conditional("TernaryOp"));
        assert!(config.is_function("FuncDef"));
        assert_eq!(config.discriminator, "_nodetype");
        assert_eq!(config.max_type_depth, 8);
    }

    #[test]
    fn errors_name_the_offending_path() {
        let err = AnalyzerConfig::from_json_str(r#"{"conditional_kinds": ["If", 3]}"#).unwrap_err();
        match err {
            ConfigError::Deserialize { path, .. } => assert_eq!(path, "conditional_kinds[1]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AnalyzerConfig::from_json_str(r#"{"sentinal": "?"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AnalyzerConfig::from_json_str(r#"{"discriminator": ""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AnalyzerConfig::from_json_str(r#"{"function_kinds": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AnalyzerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn serializes_back_to_loadable_json() {
        let config = AnalyzerConfig { sentinel: "n/a".into(), ..AnalyzerConfig::default() };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(AnalyzerConfig::from_json_str(&text).unwrap(), config);
    }
}
