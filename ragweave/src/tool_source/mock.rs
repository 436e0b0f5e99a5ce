//! Mock tool source for tests: fixed tool list, canned replies, recorded calls.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock tool source: each registered tool answers with fixed text.
#[derive(Default)]
pub struct MockToolSource {
    specs: Vec<ToolSpec>,
    replies: HashMap<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool that takes `{"query": string}` and returns `reply` (builder).
    pub fn with_tool(mut self, name: impl Into<String>, reply: impl Into<String>) -> Self {
        let name = name.into();
        self.specs.push(ToolSpec {
            name: name.clone(),
            description: Some(format!("mock tool {}", name)),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        });
        self.replies.insert(name, reply.into());
        self
    }

    /// Every `(name, arguments)` pair called so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.specs.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((name.to_string(), arguments));
        self.replies
            .get(name)
            .map(|text| ToolCallContent { text: text.clone() })
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))
    }
}
