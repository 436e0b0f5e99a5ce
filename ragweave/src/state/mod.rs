//! State threaded through the RAG graph.
//!
//! One [`AgentState`] is created per user turn by [`AgentState::new`], passed by value from
//! node to node by [`CompiledStateGraph`](crate::graph::CompiledStateGraph), and dropped once
//! the turn's final message is produced.
//!
//! # Field ownership
//!
//! | field             | written by                                    | read by                          |
//! |-------------------|-----------------------------------------------|----------------------------------|
//! | original_question | history (overwrite)                           | validation, decision, answer     |
//! | question          | history, query transform                      | tool routing                     |
//! | history           | caller                                        | history                          |
//! | context           | update_context (append only)                  | decision, answer, validation     |
//! | chunks            | extract_chunks, selection; cleared by update  | reranking, selection, update     |
//! | reranking_score   | reranking; cleared by selection               | selection                        |
//! | messages          | every node (append only)                      | conditional edges, decision      |

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::Message;

pub use crate::message::ToolCall;

/// Shared record for one turn of the RAG agent.
///
/// Invariant: whenever `chunks` and `reranking_score` are both present they have the same
/// length and index `i` of one belongs to index `i` of the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// The user's literal input; only history summarization overwrites it.
    pub original_question: String,
    /// Query used for retrieval; may be rewritten by query transformation.
    pub question: String,
    /// Prior turns' content, joined by newlines.
    pub history: String,
    /// Retrieved text accumulated over the turn.
    pub context: String,
    /// Candidate snippets awaiting reranking and selection.
    pub chunks: Option<Vec<String>>,
    /// Scores parallel to `chunks`.
    pub reranking_score: Option<Vec<f64>>,
    /// Transcript of every node's output.
    pub messages: Vec<Message>,
}

impl AgentState {
    /// Fresh state for one turn: `original_question` and `question` both start as `question`.
    pub fn new(question: impl Into<String>, history: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            original_question: question.clone(),
            question,
            history: history.into(),
            ..Self::default()
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Content of the last message, or `""` when the transcript is empty.
    pub fn last_content(&self) -> &str {
        self.messages.last().map(Message::content).unwrap_or("")
    }

    /// The turn's answer: the last message of the transcript.
    pub fn answer(&self) -> Option<&str> {
        self.messages.last().map(Message::content)
    }

    /// Serialized record of every tool call requested so far, one line per requesting message.
    pub fn past_tool_calls(&self) -> String {
        let mut out = String::new();
        for msg in &self.messages {
            let calls = msg.tool_calls();
            if calls.is_empty() {
                continue;
            }
            let line = serde_json::to_string(calls).unwrap_or_else(|_| format!("{:?}", calls));
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Borrows `chunks` and `reranking_score` together, checking they are present and aligned.
    pub fn scored_chunks(&self) -> Result<(&[String], &[f64]), AgentError> {
        let chunks = self
            .chunks
            .as_deref()
            .ok_or_else(|| AgentError::InvalidState("no chunks to select from".into()))?;
        let scores = self
            .reranking_score
            .as_deref()
            .ok_or_else(|| AgentError::InvalidState("chunks have not been scored".into()))?;
        if chunks.len() != scores.len() {
            return Err(AgentError::InvalidState(format!(
                "{} chunks but {} scores",
                chunks.len(),
                scores.len()
            )));
        }
        Ok((chunks, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_both_questions() {
        let s = AgentState::new("what is rust?", "prior");
        assert_eq!(s.original_question, "what is rust?");
        assert_eq!(s.question, "what is rust?");
        assert_eq!(s.history, "prior");
        assert!(s.chunks.is_none());
        assert!(s.reranking_score.is_none());
        assert!(s.messages.is_empty());
        assert_eq!(s.last_content(), "");
        assert_eq!(s.answer(), None);
    }

    #[test]
    fn past_tool_calls_lists_only_requesting_messages() {
        let mut s = AgentState::new("q", "");
        s.messages.push(Message::assistant("retrieve"));
        s.messages.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                name: "physics_retriever".into(),
                arguments: r#"{"query":"gravity"}"#.into(),
                id: Some("c1".into()),
            }],
        ));
        s.messages.push(Message::tool("physics_retriever", Some("c1".into()), "a\n\nb"));
        let past = s.past_tool_calls();
        assert_eq!(past.lines().count(), 1);
        assert!(past.contains("physics_retriever"));
        assert!(past.contains("gravity"));
    }

    #[test]
    fn scored_chunks_rejects_misaligned_vectors() {
        let mut s = AgentState::new("q", "");
        s.chunks = Some(vec!["a".into(), "b".into()]);
        s.reranking_score = Some(vec![0.5]);
        assert!(matches!(s.scored_chunks(), Err(AgentError::InvalidState(_))));
        s.reranking_score = Some(vec![0.5, 0.1]);
        let (c, sc) = s.scored_chunks().unwrap();
        assert_eq!(c.len(), sc.len());
    }
}
