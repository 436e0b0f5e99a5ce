//! Application configuration: feature flags, strategy choices and their options.
//!
//! Loaded from a `.json`, `.yaml` or `.yml` file (format chosen by extension). Every field has
//! a default, so a file only lists what it changes. Strategy names are kept as strings here
//! and parsed by the node that uses them, which is where an unsupported name is reported.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::DEFAULT_RECURSION_LIMIT;

/// Reads `path` into `T`, picking JSON or YAML by file extension.
pub fn read_config_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("read {}: {}", path.display(), e)))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => serde_json::from_str(&content)
            .map_err(|e| ConfigError::Load(format!("parse {}: {}", path.display(), e))),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Load(format!("parse {}: {}", path.display(), e))),
        _ => Err(ConfigError::Load(format!(
            "unsupported config format: {}",
            path.display()
        ))),
    }
}

/// Options of one query transformation strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTransformOptions {
    /// Upper bound on the rewritten query length, passed to the prompt.
    #[serde(default)]
    pub max_char: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOptions {
    #[serde(default)]
    pub min: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopkOptions {
    #[serde(default)]
    pub k: Option<usize>,
}

/// Per-strategy options for chunk selection. A block is `None` when the file omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionOptions {
    #[serde(default)]
    pub threshold: Option<ThresholdOptions>,
    #[serde(default)]
    pub topk: Option<TopkOptions>,
}

/// Configuration of the RAG graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Adds query validation/transformation, reranking, selection and answer validation.
    pub advanced_rag: bool,
    /// Adds the query validation node (only with `advanced_rag`).
    pub check_input_validity: bool,
    /// Adds the answer validation node (only with `advanced_rag`).
    pub check_output_validity: bool,
    /// Query transformation strategy: `step-back` or `hyde`.
    pub query_transform: String,
    pub query_transform_options: BTreeMap<String, QueryTransformOptions>,
    /// Reranking strategies applied in order: `semantic`, `distance`.
    pub reranking_strategies: Vec<String>,
    /// One weight per reranking strategy; must sum to 1.
    pub reranking_weights: Vec<f64>,
    /// Selection strategies applied in order: `threshold`, `topk`.
    pub selection_strategies: Vec<String>,
    pub selection_options: SelectionOptions,
    /// Accepted topics for query validation. Empty means "use the retriever topics".
    pub topics: Vec<String>,
    /// Passages returned by each retriever tool.
    pub k: usize,
    /// `> 0` wraps every node with logging middleware.
    pub verbosity: u8,
    /// Node executions allowed per turn.
    pub recursion_limit: usize,
    /// Time limit for each LLM, embedding and tool call; `None` means no limit.
    pub capability_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut query_transform_options = BTreeMap::new();
        query_transform_options.insert(
            "step-back".to_string(),
            QueryTransformOptions {
                max_char: Some(100),
            },
        );
        query_transform_options.insert(
            "hyde".to_string(),
            QueryTransformOptions {
                max_char: Some(500),
            },
        );
        Self {
            advanced_rag: true,
            check_input_validity: true,
            check_output_validity: true,
            query_transform: "step-back".to_string(),
            query_transform_options,
            reranking_strategies: vec!["semantic".to_string()],
            reranking_weights: vec![1.0],
            selection_strategies: vec!["threshold".to_string(), "topk".to_string()],
            selection_options: SelectionOptions {
                threshold: Some(ThresholdOptions { min: Some(0.5) }),
                topk: Some(TopkOptions { k: Some(3) }),
            },
            topics: Vec::new(),
            k: 4,
            verbosity: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            capability_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads a config file; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_config_file(path)
    }

    /// Config for the simple pipeline: no validation, transformation, reranking or selection.
    pub fn simple() -> Self {
        Self {
            advanced_rag: false,
            ..Self::default()
        }
    }

    pub fn capability_timeout(&self) -> Option<Duration> {
        self.capability_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_flag() {
        let c = AppConfig::default();
        assert!(c.advanced_rag && c.check_input_validity && c.check_output_validity);
        assert_eq!(c.recursion_limit, 25);
        assert_eq!(c.query_transform_options["hyde"].max_char, Some(500));
        assert_eq!(c.capability_timeout(), None);
        assert!(!AppConfig::simple().advanced_rag);
    }

    #[test]
    fn load_yaml_keeps_defaults_for_absent_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(
            &path,
            "check_output_validity: false\n\
             query_transform: hyde\n\
             query_transform_options:\n  hyde:\n    max_char: 250\n\
             reranking_strategies: [semantic, distance]\n\
             reranking_weights: [0.7, 0.3]\n\
             selection_options:\n  topk:\n    k: 2\n\
             capability_timeout_secs: 30\n",
        )
        .unwrap();
        let c = AppConfig::load(&path).unwrap();
        assert!(c.advanced_rag);
        assert!(!c.check_output_validity);
        assert_eq!(c.query_transform, "hyde");
        assert_eq!(c.query_transform_options["hyde"].max_char, Some(250));
        assert!(!c.query_transform_options.contains_key("step-back"));
        assert_eq!(c.reranking_weights, vec![0.7, 0.3]);
        assert_eq!(c.selection_options.topk, Some(TopkOptions { k: Some(2) }));
        assert!(c.selection_options.threshold.is_none());
        assert_eq!(c.capability_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn load_json_and_reject_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("app.json");
        std::fs::write(&json, r#"{"advanced_rag": false, "topics": ["physics"], "k": 2}"#).unwrap();
        let c = AppConfig::load(&json).unwrap();
        assert!(!c.advanced_rag);
        assert_eq!(c.topics, vec!["physics"]);
        assert_eq!(c.k, 2);

        let toml = dir.path().join("app.toml");
        std::fs::write(&toml, "k = 2").unwrap();
        assert!(matches!(AppConfig::load(&toml), Err(ConfigError::Load(_))));
        assert!(matches!(
            AppConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Load(_))
        ));
    }
}
