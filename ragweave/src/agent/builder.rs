//! Builds the compiled RAG graph from configuration, prompts and capabilities.
//!
//! Every structural misconfiguration surfaces here, before any turn runs: unknown strategy
//! names, missing strategy options, missing prompts, a strategy without the capability it
//! needs. Weight sums are the exception; they are checked when reranking runs.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::classify::{is_related, tool_condition, Classifiers};
use super::nodes::{
    AnswerValidationNode, ExtractChunksNode, GenerateAnswerNode, HistoryNode,
    QueryTransformNode, QueryValidationNode, RerankingNode, RetrieveOrRespondNode,
    SelectionNode, ToolExecutionNode, ToolRoutingNode, UpdateContextNode,
};
use super::topology::*;
use crate::config::AppConfig;
use crate::embedding::Embedder;
use crate::error::ConfigError;
use crate::graph::{
    CompilationError, CompiledStateGraph, ConditionalRouterFn, LoggingNodeMiddleware, Node,
    StateGraph,
};
use crate::llm::{bind_tools, LlmClient};
use crate::prompts::{keys, RagPrompts};
use crate::scoring::{
    ChunkScorer, DistanceScorer, RerankStrategy, Reranker, Selector, SemanticScorer,
};
use crate::state::AgentState;
use crate::timeout::{TimeoutEmbedder, TimeoutLlm, TimeoutToolSource};
use crate::tool_source::{ToolSource, ToolSourceError};

/// Why the RAG graph could not be built.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("graph compilation failed: {0}")]
    Compile(#[from] CompilationError),
    #[error("listing tools failed: {0}")]
    Tools(#[from] ToolSourceError),
}

/// Capabilities after the optional time limit has been applied.
struct Capabilities {
    llm: Arc<dyn LlmClient>,
    judge: Arc<dyn LlmClient>,
    embedder: Option<Arc<dyn Embedder>>,
    tools: Arc<dyn ToolSource>,
}

/// Builder for the RAG graph.
///
/// The main chat model drives every conversational node. The semantic reranking judge
/// defaults to the same model; the distance strategy needs an embedder.
pub struct RagGraphBuilder {
    config: AppConfig,
    prompts: RagPrompts,
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    judge: Option<Arc<dyn LlmClient>>,
    embedder: Option<Arc<dyn Embedder>>,
    topics: Vec<String>,
    classifiers: Classifiers,
}

impl RagGraphBuilder {
    /// Starts from the embedded default prompts.
    pub fn new(config: AppConfig, llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolSource>) -> Self {
        Self {
            config,
            prompts: RagPrompts::default_from_embedded(),
            llm,
            tools,
            judge: None,
            embedder: None,
            topics: Vec::new(),
            classifiers: Classifiers::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: RagPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Separate model for the semantic reranking strategy.
    pub fn with_semantic_judge(mut self, judge: Arc<dyn LlmClient>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Embedder for the distance reranking strategy.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Accepted topics used when the config lists none (e.g. `RetrieverToolSource::topics`).
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_classifiers(mut self, classifiers: Classifiers) -> Self {
        self.classifiers = classifiers;
        self
    }

    pub fn topology(&self) -> Topology {
        Topology::from_config(&self.config)
    }

    fn capabilities(&self) -> Capabilities {
        let judge = self.judge.clone().unwrap_or_else(|| self.llm.clone());
        match self.config.capability_timeout() {
            None => Capabilities {
                llm: self.llm.clone(),
                judge,
                embedder: self.embedder.clone(),
                tools: self.tools.clone(),
            },
            Some(limit) => Capabilities {
                llm: Arc::new(TimeoutLlm::new(self.llm.clone(), limit)),
                judge: Arc::new(TimeoutLlm::new(judge, limit)),
                embedder: self
                    .embedder
                    .clone()
                    .map(|e| Arc::new(TimeoutEmbedder::new(e, limit)) as Arc<dyn Embedder>),
                tools: Arc::new(TimeoutToolSource::new(self.tools.clone(), limit)),
            },
        }
    }

    fn accepted_topics(&self) -> Result<Vec<String>, ConfigError> {
        let topics = if self.config.topics.is_empty() {
            self.topics.clone()
        } else {
            self.config.topics.clone()
        };
        if topics.is_empty() {
            return Err(ConfigError::MissingOption {
                strategy: "query validation".to_string(),
                option: "topics".to_string(),
            });
        }
        Ok(topics)
    }

    fn reranker(&self, caps: &Capabilities) -> Result<Reranker, ConfigError> {
        let mut scorers: Vec<Arc<dyn ChunkScorer>> = Vec::new();
        for name in &self.config.reranking_strategies {
            let scorer: Arc<dyn ChunkScorer> = match name.parse::<RerankStrategy>()? {
                RerankStrategy::Semantic => Arc::new(SemanticScorer::new(
                    caps.judge.clone(),
                    self.prompts
                        .require_with(keys::RERANKING, &["question", "chunk"])?,
                )),
                RerankStrategy::Distance => {
                    let embedder =
                        caps.embedder
                            .clone()
                            .ok_or_else(|| ConfigError::MissingCapability {
                                strategy: name.clone(),
                                capability: "embedder",
                            })?;
                    Arc::new(DistanceScorer::new(embedder))
                }
            };
            scorers.push(scorer);
        }
        Ok(Reranker::new(scorers, self.config.reranking_weights.clone()))
    }

    async fn node(
        &self,
        id: &'static str,
        caps: &Capabilities,
    ) -> Result<Arc<dyn Node<AgentState>>, BuildError> {
        let llm = caps.llm.clone();
        let node: Arc<dyn Node<AgentState>> = match id {
            HISTORY_INTEGRATION => Arc::new(HistoryNode::new(llm, &self.prompts)?),
            VALIDATE_INPUT => Arc::new(QueryValidationNode::new(
                llm,
                &self.prompts,
                self.accepted_topics()?,
            )?),
            QUERY_TRANSFORM => Arc::new(QueryTransformNode::new(
                llm,
                &self.config.query_transform,
                &self.config.query_transform_options,
                &self.prompts,
            )?),
            RETRIEVE_OR_RESPOND => Arc::new(RetrieveOrRespondNode::new(llm, &self.prompts)?),
            TOOL_ROUTING => {
                let specs = caps.tools.list_tools().await?;
                tracing::debug!(tools = specs.len(), "binding tools");
                Arc::new(ToolRoutingNode::new(
                    bind_tools(llm, specs),
                    &self.prompts,
                    self.classifiers.decision.clone(),
                )?)
            }
            TOOL_EXECUTION => Arc::new(ToolExecutionNode::new(caps.tools.clone())),
            EXTRACT_CHUNKS => Arc::new(ExtractChunksNode),
            RERANKING => Arc::new(RerankingNode::new(self.reranker(caps)?)),
            SELECTION => Arc::new(SelectionNode::new(Selector::from_config(
                &self.config.selection_strategies,
                &self.config.selection_options,
            )?)),
            UPDATE_CONTEXT => Arc::new(UpdateContextNode),
            GENERATE_ANSWER => Arc::new(GenerateAnswerNode::new(llm, &self.prompts)?),
            VALIDATE_ANSWER => Arc::new(AnswerValidationNode::new(
                llm,
                &self.prompts,
                self.classifiers.verdict.clone(),
            )?),
            other => return Err(CompilationError::NodeNotFound(other.to_string()).into()),
        };
        Ok(node)
    }

    fn router(&self, router: Router) -> ConditionalRouterFn<AgentState> {
        match router {
            Router::Relevance => {
                let classifier = self.classifiers.relevance.clone();
                Arc::new(move |s: &AgentState| {
                    is_related(s, classifier.as_ref()).as_str().to_string()
                })
            }
            Router::ToolCondition => {
                Arc::new(|s: &AgentState| tool_condition(s).as_str().to_string())
            }
        }
    }

    /// Instantiates every node of the topology and compiles the graph.
    pub async fn build(self) -> Result<CompiledStateGraph<AgentState>, BuildError> {
        let topology = self.topology();
        let caps = self.capabilities();

        let mut graph = StateGraph::<AgentState>::new()
            .with_recursion_limit(self.config.recursion_limit);
        if self.config.verbosity > 0 {
            graph = graph.with_middleware(Arc::new(LoggingNodeMiddleware::<AgentState>::default()));
        }

        for id in &topology.nodes {
            let node = self.node(*id, &caps).await?;
            graph.add_node(*id, node);
        }
        for edge in &topology.edges {
            match edge {
                EdgeSpec::Plain { from, to } => {
                    graph.add_edge(*from, *to);
                }
                EdgeSpec::Branch {
                    from,
                    router,
                    branches,
                } => {
                    let path_map: HashMap<String, String> = branches
                        .iter()
                        .map(|(label, to)| (label.to_string(), to.to_string()))
                        .collect();
                    graph.add_conditional_edges(*from, self.router(*router), Some(path_map));
                }
            }
        }

        let compiled = graph.compile()?;
        tracing::info!(
            nodes = topology.nodes.len(),
            advanced_rag = topology.flags.advanced_rag,
            recursion_limit = compiled.recursion_limit(),
            "rag graph built"
        );
        Ok(compiled)
    }
}

/// Builds the RAG graph with the main model as semantic judge and no embedder.
pub async fn build_rag_graph(
    config: AppConfig,
    prompts: RagPrompts,
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
) -> Result<CompiledStateGraph<AgentState>, BuildError> {
    RagGraphBuilder::new(config, llm, tools)
        .with_prompts(prompts)
        .build()
        .await
}
