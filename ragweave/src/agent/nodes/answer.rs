//! Answer generation and answer validation.

use std::sync::Arc;

use async_trait::async_trait;

use super::{complete, truncate_for_log};
use crate::agent::classify::{AnswerVerdict, MessageClassifier};
use crate::agent::topology::{GENERATE_ANSWER, VALIDATE_ANSWER};
use crate::error::{AgentError, ConfigError};
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::prompts::{keys, PromptTemplate, RagPrompts};
use crate::state::AgentState;

/// Answers `original_question` from `context`; the reply becomes the latest message.
pub struct GenerateAnswerNode {
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
}

impl GenerateAnswerNode {
    /// Template variables: `{question}`, `{context}`.
    pub fn new(llm: Arc<dyn LlmClient>, prompts: &RagPrompts) -> Result<Self, ConfigError> {
        Ok(Self {
            llm,
            prompt: prompts.require_with(keys::OUTPUT, &["question", "context"])?,
        })
    }
}

#[async_trait]
impl Node<AgentState> for GenerateAnswerNode {
    fn id(&self) -> &str {
        GENERATE_ANSWER
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let prompt = self.prompt.render(&[
            ("question", state.original_question.as_str()),
            ("context", state.context.as_str()),
        ])?;
        let response = complete(self.llm.as_ref(), prompt).await?;
        tracing::debug!(answer = %truncate_for_log(&response.content, 120), "answer generated");
        state.messages.push(response.into_message());
        Ok((state, Next::Continue))
    }
}

/// Judges the latest message against question and context.
///
/// A passing verdict leaves the transcript as is, so the answer stays the latest message.
/// Any other verdict is appended after the answer and becomes the latest message.
pub struct AnswerValidationNode {
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
    verdict: Arc<dyn MessageClassifier<AnswerVerdict>>,
}

impl AnswerValidationNode {
    /// Template variables: `{question}`, `{context}`, `{answer}`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: &RagPrompts,
        verdict: Arc<dyn MessageClassifier<AnswerVerdict>>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            llm,
            prompt: prompts.require_with(keys::OUTPUT_CHECK, &["question", "context", "answer"])?,
            verdict,
        })
    }
}

#[async_trait]
impl Node<AgentState> for AnswerValidationNode {
    fn id(&self) -> &str {
        VALIDATE_ANSWER
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let prompt = self.prompt.render(&[
            ("question", state.original_question.as_str()),
            ("context", state.context.as_str()),
            ("answer", state.last_content()),
        ])?;
        let response = complete(self.llm.as_ref(), prompt).await?;
        match self.verdict.classify(&response.content) {
            AnswerVerdict::Pass => tracing::debug!("answer validated"),
            AnswerVerdict::Fail => {
                tracing::info!(verdict = %truncate_for_log(&response.content, 120), "answer rejected");
                state.messages.push(response.into_message());
            }
        }
        Ok((state, Next::Continue))
    }
}
