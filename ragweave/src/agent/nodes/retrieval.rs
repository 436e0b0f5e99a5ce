//! Tool-use cycle: decide, route to a tool, execute it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::{complete, truncate_for_log};
use crate::agent::classify::{Decision, MessageClassifier};
use crate::agent::topology::{RETRIEVE_OR_RESPOND, TOOL_EXECUTION, TOOL_ROUTING};
use crate::error::{AgentError, ConfigError};
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, ToolBoundLlm};
use crate::message::Message;
use crate::prompts::{keys, PromptTemplate, RagPrompts};
use crate::state::AgentState;
use crate::tool_source::ToolSource;

/// Logged by tool routing when the decision was not to retrieve.
pub const NO_TOOLS_TO_CALL: &str = "No tools to call, routing to the generate answer node";

/// Asks the model whether to retrieve more or respond; appends its raw reply.
pub struct RetrieveOrRespondNode {
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
}

impl RetrieveOrRespondNode {
    /// Template variables: `{question}`, `{context}`, `{past_tool_calls}`.
    pub fn new(llm: Arc<dyn LlmClient>, prompts: &RagPrompts) -> Result<Self, ConfigError> {
        Ok(Self {
            llm,
            prompt: prompts.require_with(
                keys::RETRIEVE_RESPOND,
                &["question", "context", "past_tool_calls"],
            )?,
        })
    }
}

#[async_trait]
impl Node<AgentState> for RetrieveOrRespondNode {
    fn id(&self) -> &str {
        RETRIEVE_OR_RESPOND
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let past_tool_calls = state.past_tool_calls();
        let prompt = self.prompt.render(&[
            ("question", state.original_question.as_str()),
            ("context", state.context.as_str()),
            ("past_tool_calls", past_tool_calls.as_str()),
        ])?;
        let response = complete(self.llm.as_ref(), prompt).await?;
        debug!(decision = %truncate_for_log(&response.content, 80), "retrieve or respond");
        state.messages.push(response.into_message());
        Ok((state, Next::Continue))
    }
}

/// Turns a "retrieve" decision into a structured tool call from the tool-bound model.
pub struct ToolRoutingNode {
    llm: ToolBoundLlm,
    prompt: PromptTemplate,
    decision: Arc<dyn MessageClassifier<Decision>>,
}

impl ToolRoutingNode {
    /// Template variables: `{tools}` (past tool calls), `{query}`.
    pub fn new(
        llm: ToolBoundLlm,
        prompts: &RagPrompts,
        decision: Arc<dyn MessageClassifier<Decision>>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            llm,
            prompt: prompts.require_with(keys::TOOL_CALLING, &["tools", "query"])?,
            decision,
        })
    }
}

#[async_trait]
impl Node<AgentState> for ToolRoutingNode {
    fn id(&self) -> &str {
        TOOL_ROUTING
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        match self.decision.classify(state.last_content()) {
            Decision::Retrieve => {
                let past_tool_calls = state.past_tool_calls();
                let prompt = self.prompt.render(&[
                    ("tools", past_tool_calls.as_str()),
                    ("query", state.question.as_str()),
                ])?;
                let response = complete(&self.llm, prompt).await?;
                debug!(
                    tool_calls = response.tool_calls.len(),
                    tools = self.llm.tools().len(),
                    "tool routing"
                );
                state.messages.push(response.into_message());
            }
            Decision::Respond => {
                debug!("{}", NO_TOOLS_TO_CALL);
                state.messages.push(Message::assistant(NO_TOOLS_TO_CALL));
            }
        }
        Ok((state, Next::Continue))
    }
}

/// Parses tool-call arguments; an empty or malformed string becomes `{}`, a JSON string
/// holding an object is unwrapped once.
fn parse_tool_arguments(arguments: &str) -> Value {
    let raw = if arguments.trim().is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_str(arguments) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, arguments = %arguments, "tool arguments JSON parse failed, using empty object");
                serde_json::json!({})
            }
        }
    };
    if let Some(s) = raw.as_str() {
        serde_json::from_str(s).unwrap_or_else(|e| {
            warn!(error = %e, "nested tool arguments JSON parse failed");
            raw
        })
    } else {
        raw
    }
}

/// Runs every tool call of the latest message and appends one tool message per result.
///
/// Tool failures propagate and abort the turn.
pub struct ToolExecutionNode {
    tools: Arc<dyn ToolSource>,
}

impl ToolExecutionNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Node<AgentState> for ToolExecutionNode {
    fn id(&self) -> &str {
        TOOL_EXECUTION
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let calls = state
            .last_message()
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default();
        if calls.is_empty() {
            return Err(AgentError::InvalidState(
                "tool execution reached without a pending tool call".into(),
            ));
        }
        for call in calls {
            let args = parse_tool_arguments(&call.arguments);
            debug!(tool = %call.name, "calling tool");
            let content = self.tools.call_tool(&call.name, args).await?;
            trace!(tool = %call.name, result = %truncate_for_log(&content.text, 200), "tool result");
            state
                .messages
                .push(Message::tool(call.name, call.id, content.text));
        }
        Ok((state, Next::Continue))
    }
}
