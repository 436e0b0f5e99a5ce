//! RAG turn runner: history from the conversation log, fresh state, invoke.
//!
//! One `ask` is one turn. The conversation log is the only thing shared between turns; it
//! is appended to only after the graph returns successfully.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::graph::CompiledStateGraph;
use crate::state::AgentState;

/// Who wrote a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub role: Role,
    pub content: String,
}

/// Append-only record of user questions and final answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.entries.push(LogEntry {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn add_ai_message(&mut self, content: impl Into<String>) {
        self.entries.push(LogEntry {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content of every entry, one per line; the `history` input of a turn.
    pub fn history(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Content of the last transcript message.
    pub answer: String,
    pub final_state: AgentState,
}

/// Runs turns against a compiled RAG graph and keeps the conversation log.
pub struct RagRunner {
    graph: CompiledStateGraph<AgentState>,
    log: ConversationLog,
}

impl RagRunner {
    pub fn new(graph: CompiledStateGraph<AgentState>) -> Self {
        Self::with_log(graph, ConversationLog::new())
    }

    /// Resumes an earlier conversation.
    pub fn with_log(graph: CompiledStateGraph<AgentState>, log: ConversationLog) -> Self {
        Self { graph, log }
    }

    pub fn graph(&self) -> &CompiledStateGraph<AgentState> {
        &self.graph
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Runs one turn. On error the log is left as it was.
    pub async fn ask(&mut self, question: &str) -> Result<TurnOutcome, AgentError> {
        let state = AgentState::new(question, self.log.history());
        tracing::info!(question = %question, history_entries = self.log.len(), "turn start");
        let final_state = self.graph.invoke(state).await?;
        let answer = final_state.answer().unwrap_or_default().to_string();
        self.log.add_user_message(question);
        self.log.add_ai_message(answer.clone());
        tracing::info!(messages = final_state.messages.len(), "turn complete");
        Ok(TurnOutcome {
            answer,
            final_state,
        })
    }
}
