//! Query-side nodes: history integration, query validation, query transformation.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use super::{complete, truncate_for_log};
use crate::agent::topology::{HISTORY_INTEGRATION, QUERY_TRANSFORM, VALIDATE_INPUT};
use crate::config::QueryTransformOptions;
use crate::error::{AgentError, ConfigError};
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::{keys, PromptTemplate, RagPrompts};
use crate::state::AgentState;

/// Folds the conversation history into the question.
///
/// Overwrites both `original_question` and `question` with the rewritten text and logs
/// `"<original> -> <rewritten>"`.
pub struct HistoryNode {
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
}

impl HistoryNode {
    /// Template variables: `{question}`, `{history}`.
    pub fn new(llm: Arc<dyn LlmClient>, prompts: &RagPrompts) -> Result<Self, ConfigError> {
        Ok(Self {
            llm,
            prompt: prompts.require_with(keys::HISTORY, &["question", "history"])?,
        })
    }
}

#[async_trait]
impl Node<AgentState> for HistoryNode {
    fn id(&self) -> &str {
        HISTORY_INTEGRATION
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let prompt = self.prompt.render(&[
            ("question", state.original_question.as_str()),
            ("history", state.history.as_str()),
        ])?;
        let rewritten = complete(self.llm.as_ref(), prompt)
            .await?
            .content
            .trim()
            .to_string();
        state.messages.push(Message::assistant(format!(
            "{} -> {}",
            state.original_question, rewritten
        )));
        state.original_question = rewritten.clone();
        state.question = rewritten;
        Ok((state, Next::Continue))
    }
}

/// Asks whether the question relates to one of the accepted topics and logs the judgment.
pub struct QueryValidationNode {
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
    topics: Vec<String>,
}

impl QueryValidationNode {
    /// Template variables: `{question}`, `{topics}`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: &RagPrompts,
        topics: Vec<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            llm,
            prompt: prompts.require_with(keys::INPUT_CHECK, &["question", "topics"])?,
            topics,
        })
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

#[async_trait]
impl Node<AgentState> for QueryValidationNode {
    fn id(&self) -> &str {
        VALIDATE_INPUT
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let topics = format!("{:?}", self.topics);
        let prompt = self.prompt.render(&[
            ("question", state.original_question.as_str()),
            ("topics", topics.as_str()),
        ])?;
        let response = complete(self.llm.as_ref(), prompt).await?;
        tracing::debug!(judgment = %truncate_for_log(&response.content, 80), "query validation");
        state.messages.push(Message::assistant(format!(
            "Is \"{}\" related with at least one of this topics {}? {}",
            state.original_question, topics, response.content
        )));
        Ok((state, Next::Continue))
    }
}

/// Query transformation technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTransformStrategy {
    /// Rewrites the question into a more generic one.
    StepBack,
    /// Writes a hypothetical answer passage to retrieve with.
    Hyde,
}

impl QueryTransformStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StepBack => "step-back",
            Self::Hyde => "hyde",
        }
    }

    pub fn default_max_char(&self) -> usize {
        match self {
            Self::StepBack => 100,
            Self::Hyde => 500,
        }
    }
}

impl FromStr for QueryTransformStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step-back" => Ok(Self::StepBack),
            "hyde" => Ok(Self::Hyde),
            other => Err(ConfigError::UnsupportedStrategy {
                kind: "query transformation",
                name: other.to_string(),
            }),
        }
    }
}

/// Rewrites `question` with the configured strategy; `original_question` is kept.
pub struct QueryTransformNode {
    llm: Arc<dyn LlmClient>,
    strategy: QueryTransformStrategy,
    max_char: usize,
    prompt: PromptTemplate,
}

impl QueryTransformNode {
    /// Fails on an unknown strategy, a missing options block for it, or a missing prompt.
    /// `max_char` falls back to the strategy's default when its block omits it.
    ///
    /// Template variables: `{question}`, `{max_char}`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        strategy: &str,
        options: &BTreeMap<String, QueryTransformOptions>,
        prompts: &RagPrompts,
    ) -> Result<Self, ConfigError> {
        let parsed: QueryTransformStrategy = strategy.parse()?;
        let block = options
            .get(parsed.as_str())
            .ok_or_else(|| ConfigError::MissingOptions(parsed.as_str().to_string()))?;
        let prompt_name = format!("{}.{}", keys::QUERY_TRANSFORMATION, parsed.as_str());
        Ok(Self {
            llm,
            strategy: parsed,
            max_char: block.max_char.unwrap_or_else(|| parsed.default_max_char()),
            prompt: prompts.require_with(&prompt_name, &["question", "max_char"])?,
        })
    }

    pub fn strategy(&self) -> QueryTransformStrategy {
        self.strategy
    }

    pub fn max_char(&self) -> usize {
        self.max_char
    }
}

#[async_trait]
impl Node<AgentState> for QueryTransformNode {
    fn id(&self) -> &str {
        QUERY_TRANSFORM
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let max_char = self.max_char.to_string();
        let prompt = self.prompt.render(&[
            ("question", state.original_question.as_str()),
            ("max_char", max_char.as_str()),
        ])?;
        let rewritten = complete(self.llm.as_ref(), prompt)
            .await?
            .content
            .trim()
            .to_string();
        tracing::debug!(strategy = self.strategy.as_str(), "query transformed");
        state.messages.push(Message::assistant(format!(
            "\"{}\" -> {}",
            state.original_question, rewritten
        )));
        state.question = rewritten;
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;

    fn prompts() -> RagPrompts {
        RagPrompts::default_from_embedded()
    }

    #[test]
    fn query_transform_rejects_unknown_strategy_and_missing_options() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::with_reply("x"));
        let mut options = BTreeMap::new();
        assert!(matches!(
            QueryTransformNode::new(llm.clone(), "rag-fusion", &options, &prompts()),
            Err(ConfigError::UnsupportedStrategy { .. })
        ));
        assert_eq!(
            QueryTransformNode::new(llm.clone(), "hyde", &options, &prompts()).err(),
            Some(ConfigError::MissingOptions("hyde".into()))
        );
        options.insert("hyde".to_string(), QueryTransformOptions::default());
        let node = QueryTransformNode::new(llm, "hyde", &options, &prompts()).unwrap();
        assert_eq!(node.max_char(), 500);
        assert_eq!(node.strategy(), QueryTransformStrategy::Hyde);
    }

    #[tokio::test]
    async fn history_node_overwrites_both_questions() {
        let llm = Arc::new(MockLlm::with_reply("  what is general relativity?  "));
        let node = HistoryNode::new(llm.clone(), &prompts()).unwrap();
        let state = AgentState::new("and that?", "user: what did einstein do?");
        let (state, next) = node.run(state).await.unwrap();
        assert_eq!(next, Next::Continue);
        assert_eq!(state.original_question, "what is general relativity?");
        assert_eq!(state.question, "what is general relativity?");
        assert_eq!(
            state.last_content(),
            "and that? -> what is general relativity?"
        );
        assert!(llm.calls()[0].prompt().contains("user: what did einstein do?"));
    }

    #[tokio::test]
    async fn query_transform_keeps_original_question() {
        let llm = Arc::new(MockLlm::with_reply("what is gravity in general?"));
        let mut options = BTreeMap::new();
        options.insert(
            "step-back".to_string(),
            QueryTransformOptions { max_char: Some(42) },
        );
        let node = QueryTransformNode::new(llm.clone(), "step-back", &options, &prompts()).unwrap();
        let (state, _) = node.run(AgentState::new("why do apples fall?", "")).await.unwrap();
        assert_eq!(state.original_question, "why do apples fall?");
        assert_eq!(state.question, "what is gravity in general?");
        assert_eq!(
            state.last_content(),
            "\"why do apples fall?\" -> what is gravity in general?"
        );
        assert!(llm.calls()[0].prompt().contains("42"));
    }

    #[tokio::test]
    async fn query_validation_logs_question_topics_and_judgment() {
        let llm = Arc::new(MockLlm::with_reply("Yes"));
        let node =
            QueryValidationNode::new(llm, &prompts(), vec!["physics".into(), "math".into()])
                .unwrap();
        let (state, _) = node.run(AgentState::new("what is a vector?", "")).await.unwrap();
        assert_eq!(
            state.last_content(),
            "Is \"what is a vector?\" related with at least one of this topics [\"physics\", \"math\"]? Yes"
        );
    }
}
