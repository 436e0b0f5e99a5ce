//! Classification of the latest message into the small label sets the graph branches on.
//!
//! Model replies are free text, so every branch decision goes through a
//! [`MessageClassifier`]. The defaults are case-insensitive keyword checks; a stricter rule
//! can be swapped in through [`Classifiers`] without touching the graph wiring.

use std::sync::Arc;

use crate::state::AgentState;

/// Maps message content to a label.
pub trait MessageClassifier<L>: Send + Sync {
    fn classify(&self, content: &str) -> L;
}

impl<L, F> MessageClassifier<L> for F
where
    F: Fn(&str) -> L + Send + Sync,
{
    fn classify(&self, content: &str) -> L {
        self(content)
    }
}

/// Returns `on_match` when the content contains `keyword` (ignoring case), else `otherwise`.
#[derive(Debug, Clone)]
pub struct KeywordClassifier<L> {
    keyword: String,
    on_match: L,
    otherwise: L,
}

impl<L: Copy> KeywordClassifier<L> {
    pub fn new(keyword: impl Into<String>, on_match: L, otherwise: L) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            on_match,
            otherwise,
        }
    }
}

impl<L: Copy + Send + Sync> MessageClassifier<L> for KeywordClassifier<L> {
    fn classify(&self, content: &str) -> L {
        if content.to_lowercase().contains(&self.keyword) {
            self.on_match
        } else {
            self.otherwise
        }
    }
}

/// Whether the question concerns an accepted topic. No "unknown": anything else is unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Related,
    Unrelated,
}

impl Relevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Related => "related",
            Self::Unrelated => "unrelated",
        }
    }
}

/// Retrieve-or-respond decision read by the tool routing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retrieve,
    Respond,
}

/// Branch after tool routing: run tools, or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRoute {
    Retrieve,
    Respond,
}

impl ToolRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Respond => "respond",
        }
    }
}

/// Judge verdict on a generated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerVerdict {
    Pass,
    Fail,
}

/// Classifiers used by the RAG graph.
#[derive(Clone)]
pub struct Classifiers {
    pub relevance: Arc<dyn MessageClassifier<Relevance>>,
    pub decision: Arc<dyn MessageClassifier<Decision>>,
    pub verdict: Arc<dyn MessageClassifier<AnswerVerdict>>,
}

impl Default for Classifiers {
    /// `"yes"` → related, `"retrieve"` → retrieve, `"pass"` → pass.
    ///
    /// Matching is a case-insensitive substring test over the whole message. The validation
    /// log line also quotes the question and the accepted topics, so a question such as
    /// "What did Yesenia say?" or a topic such as "eyes" reads as related even when the judge
    /// answered no. Swap in a stricter `relevance` classifier when that matters.
    fn default() -> Self {
        Self {
            relevance: Arc::new(KeywordClassifier::new(
                "yes",
                Relevance::Related,
                Relevance::Unrelated,
            )),
            decision: Arc::new(KeywordClassifier::new(
                "retrieve",
                Decision::Retrieve,
                Decision::Respond,
            )),
            verdict: Arc::new(KeywordClassifier::new(
                "pass",
                AnswerVerdict::Pass,
                AnswerVerdict::Fail,
            )),
        }
    }
}

/// Relevance of the latest message (the validation log line).
pub fn is_related(state: &AgentState, classifier: &dyn MessageClassifier<Relevance>) -> Relevance {
    classifier.classify(state.last_content())
}

/// `Retrieve` iff the latest message carries at least one structured tool call.
pub fn tool_condition(state: &AgentState) -> ToolRoute {
    match state.last_message() {
        Some(msg) if msg.has_tool_calls() => ToolRoute::Retrieve,
        _ => ToolRoute::Respond,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, ToolCall};

    #[test]
    fn default_relevance_matches_yes_anywhere_ignoring_case() {
        let c = Classifiers::default();
        assert_eq!(c.relevance.classify("YES, it is"), Relevance::Related);
        assert_eq!(c.relevance.classify("Is \"q\" related? Yes."), Relevance::Related);
        assert_eq!(c.relevance.classify("No, unrelated."), Relevance::Unrelated);
        assert_eq!(c.relevance.classify("maybe"), Relevance::Unrelated);
    }

    #[test]
    fn default_decision_and_verdict() {
        let c = Classifiers::default();
        assert_eq!(c.decision.classify("I will RETRIEVE more"), Decision::Retrieve);
        assert_eq!(c.decision.classify("respond"), Decision::Respond);
        assert_eq!(c.verdict.classify("Pass."), AnswerVerdict::Pass);
        assert_eq!(
            c.verdict.classify("Fails: unsupported claim"),
            AnswerVerdict::Fail
        );
    }

    #[test]
    fn default_relevance_sees_yes_inside_quoted_question() {
        let line = "Is \"What did Yesenia say?\" related with at least one of this topics [\"eyes\"]? No";
        assert_eq!(Classifiers::default().relevance.classify(line), Relevance::Related);

        let judged = |content: &str| match content.rsplit('?').next() {
            Some(verdict) if verdict.to_lowercase().contains("yes") => Relevance::Related,
            _ => Relevance::Unrelated,
        };
        let strict = Classifiers {
            relevance: Arc::new(judged),
            ..Classifiers::default()
        };
        assert_eq!(strict.relevance.classify(line), Relevance::Unrelated);
        assert_eq!(
            strict.relevance.classify(
                "Is \"Why do apples fall?\" related with at least one of this topics [\"physics\"]? Yes"
            ),
            Relevance::Related
        );
    }

    #[test]
    fn closures_are_classifiers() {
        let strict = |content: &str| {
            if content.trim().eq_ignore_ascii_case("yes") {
                Relevance::Related
            } else {
                Relevance::Unrelated
            }
        };
        assert_eq!(strict.classify("yes"), Relevance::Related);
        assert_eq!(strict.classify("yes, but"), Relevance::Unrelated);
    }

    #[test]
    fn tool_condition_looks_at_structured_calls_only() {
        let mut state = AgentState::new("q", "");
        assert_eq!(tool_condition(&state), ToolRoute::Respond);
        state.messages.push(Message::assistant("retrieve"));
        assert_eq!(tool_condition(&state), ToolRoute::Respond);
        state.messages.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                name: "physics_retriever".into(),
                arguments: "{}".into(),
                id: None,
            }],
        ));
        assert_eq!(tool_condition(&state), ToolRoute::Retrieve);
        assert_eq!(ToolRoute::Retrieve.as_str(), "retrieve");
    }
}
