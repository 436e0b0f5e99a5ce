//! Prompt templates for the RAG nodes, by name.
//!
//! **Canonical source**: default prompt text lives in `ragweave/prompts/default.yaml`; it is
//! embedded at compile time and parsed by [`RagPrompts::default_from_embedded`]. A prompts
//! file (JSON or YAML, same shape) replaces it via [`RagPrompts::load`].
//!
//! Each node asks for its template with [`RagPrompts::require`] while the graph is built, so a
//! missing prompt fails the build with [`ConfigError::MissingPrompt`] instead of failing a turn.

mod template;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::read_config_file;
use crate::error::ConfigError;

pub use template::PromptTemplate;

const EMBEDDED_DEFAULT: &str = include_str!("../../prompts/default.yaml");

/// Prompt names accepted by [`RagPrompts::require`].
pub mod keys {
    pub const HISTORY: &str = "history";
    pub const INPUT_CHECK: &str = "input_check";
    pub const RETRIEVE_RESPOND: &str = "retrieve_respond";
    pub const TOOL_CALLING: &str = "tool_calling";
    pub const RERANKING: &str = "reranking";
    pub const OUTPUT: &str = "output";
    pub const OUTPUT_CHECK: &str = "output_check";
    /// Prefix for query transformation prompts: `query_transformation.<strategy>`.
    pub const QUERY_TRANSFORMATION: &str = "query_transformation";
}

/// Every prompt template the RAG graph may use. Absent entries stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub history: Option<String>,
    pub input_check: Option<String>,
    /// Strategy name (`step-back`, `hyde`) to template.
    pub query_transformation: BTreeMap<String, String>,
    pub retrieve_respond: Option<String>,
    pub tool_calling: Option<String>,
    pub reranking: Option<String>,
    pub output: Option<String>,
    pub output_check: Option<String>,
}

impl RagPrompts {
    /// Loads prompts from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_config_file(path)
    }

    /// Loads `path` when given, else the embedded defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default_from_embedded()),
        }
    }

    /// Default prompts parsed from the embedded `prompts/default.yaml`.
    pub fn default_from_embedded() -> Self {
        serde_yaml::from_str(EMBEDDED_DEFAULT).unwrap_or_default()
    }

    /// Fills every absent prompt from `defaults` (builder).
    pub fn or_defaults(mut self, defaults: RagPrompts) -> Self {
        self.history = self.history.or(defaults.history);
        self.input_check = self.input_check.or(defaults.input_check);
        self.retrieve_respond = self.retrieve_respond.or(defaults.retrieve_respond);
        self.tool_calling = self.tool_calling.or(defaults.tool_calling);
        self.reranking = self.reranking.or(defaults.reranking);
        self.output = self.output.or(defaults.output);
        self.output_check = self.output_check.or(defaults.output_check);
        for (strategy, text) in defaults.query_transformation {
            self.query_transformation.entry(strategy).or_insert(text);
        }
        self
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        let text = match name {
            keys::HISTORY => self.history.as_deref(),
            keys::INPUT_CHECK => self.input_check.as_deref(),
            keys::RETRIEVE_RESPOND => self.retrieve_respond.as_deref(),
            keys::TOOL_CALLING => self.tool_calling.as_deref(),
            keys::RERANKING => self.reranking.as_deref(),
            keys::OUTPUT => self.output.as_deref(),
            keys::OUTPUT_CHECK => self.output_check.as_deref(),
            other => other
                .strip_prefix(keys::QUERY_TRANSFORMATION)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|strategy| self.query_transformation.get(strategy))
                .map(String::as_str),
        };
        text.filter(|t| !t.trim().is_empty())
    }

    /// Parsed template `name`; `MissingPrompt` when absent or blank.
    pub fn require(&self, name: &str) -> Result<PromptTemplate, ConfigError> {
        let text = self
            .lookup(name)
            .ok_or_else(|| ConfigError::MissingPrompt(name.to_string()))?;
        PromptTemplate::parse(name, text)
    }

    /// Like [`require`](Self::require), then checks the template only uses `variables`.
    pub fn require_with(
        &self,
        name: &str,
        variables: &[&str],
    ) -> Result<PromptTemplate, ConfigError> {
        let template = self.require(name)?;
        template.check_variables(variables)?;
        Ok(template)
    }
}
