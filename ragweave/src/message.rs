//! Message types for the agent transcript.
//!
//! Roles: System, User, Assistant (optionally carrying tool-call requests), Tool (the result
//! of one tool call). `AgentState::messages` is an append-only list of these; the graph's
//! conditional edges only look at the last one.

use serde::{Deserialize, Serialize};

/// A single tool invocation requested by the chat model.
///
/// Aligns with MCP `tools/call`: `name` and `arguments` (JSON object as string). `id`
/// correlates the request with the `Message::Tool` that carries its result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as listed by the tool source (e.g. `physics_retriever`).
    pub name: String,
    /// Arguments as a JSON string; parsed when the tool is executed.
    pub arguments: String,
    /// Optional id to match with the tool result message.
    pub id: Option<String>,
}

/// A single message in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// System prompt.
    System(String),
    /// User input (rendered prompts are sent to the model as user messages).
    User(String),
    /// Model or node output; `tool_calls` is non-empty when the model requested tools.
    Assistant {
        content: String,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call.
    Tool {
        content: String,
        name: String,
        call_id: Option<String>,
    },
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Creates an assistant message without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    /// Creates an assistant message carrying tool-call requests.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Creates a tool result message.
    pub fn tool(
        name: impl Into<String>,
        call_id: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Tool {
            content: content.into(),
            name: name.into(),
            call_id,
        }
    }

    /// Text content regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Self::System(c) | Self::User(c) => c,
            Self::Assistant { content, .. } | Self::Tool { content, .. } => content,
        }
    }

    /// Tool calls requested by this message; empty for every role but Assistant.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: constructors produce the correct variant with content.
    #[test]
    fn message_constructors() {
        assert!(matches!(Message::system("s"), Message::System(c) if c == "s"));
        assert!(matches!(Message::user("u"), Message::User(c) if c == "u"));
        let ast = Message::assistant("a");
        assert_eq!(ast.content(), "a");
        assert!(!ast.has_tool_calls());
        let tool = Message::tool("physics_retriever", Some("c1".into()), "text");
        assert_eq!(tool.content(), "text");
        assert!(tool.tool_calls().is_empty());
    }

    #[test]
    fn assistant_with_tool_calls_exposes_calls() {
        let msg = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                name: "physics_retriever".into(),
                arguments: r#"{"query":"gravity"}"#.into(),
                id: Some("c1".into()),
            }],
        );
        assert!(msg.has_tool_calls());
        assert_eq!(msg.tool_calls()[0].name, "physics_retriever");
    }

    /// **Scenario**: Each Message variant round-trips through serde.
    #[test]
    fn message_serialize_deserialize_roundtrip() {
        for msg in [
            Message::system("sys"),
            Message::user("usr"),
            Message::assistant("ast"),
            Message::tool("t", None, "out"),
        ] {
            let json = serde_json::to_string(&msg).expect("serialize");
            let back: Message = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(msg, back);
        }
    }
}
