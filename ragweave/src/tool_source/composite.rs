//! Several tool sources behind one: tools are listed in source order and a call goes to the
//! first source that lists the tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

pub struct CompositeToolSource {
    sources: Vec<Arc<dyn ToolSource>>,
}

impl CompositeToolSource {
    pub fn new(sources: Vec<Arc<dyn ToolSource>>) -> Self {
        Self { sources }
    }

    /// Appends a source (builder).
    pub fn with_source(mut self, source: Arc<dyn ToolSource>) -> Self {
        self.sources.push(source);
        self
    }
}

#[async_trait]
impl ToolSource for CompositeToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        let mut all = Vec::new();
        for source in &self.sources {
            all.extend(source.list_tools().await?);
        }
        Ok(all)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        for source in &self.sources {
            let tools = source.list_tools().await?;
            if tools.iter().any(|t| t.name == name) {
                return source.call_tool(name, arguments).await;
            }
        }
        Err(ToolSourceError::NotFound(name.to_string()))
    }
}
