use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::callback::AgentCallback;
use super::error::AgentError;
use super::memory::ChatMemory;
use super::strategy::Strategy;
use crate::llm::tokens::TokenUsage;
use crate::llm::traits::LLM;
use crate::tools::traits::Tool;

/// A model plus the tools it may call while answering.
pub struct Agent {
    pub name: String,
    pub llm: Arc<dyn LLM>,

    /// Keyed by the name the model uses to call each tool.
    pub tools: HashMap<String, Arc<dyn Tool>>,

    /// Role instructions sent ahead of the strategy and tool prompts.
    pub system_prompt: Option<String>,

    /// Earlier exchanges, replayed on every call. Clones share it.
    pub memory: ChatMemory,

    pub strategy: Strategy,
    pub callbacks: Vec<Arc<dyn AgentCallback>>,

    /// Model calls allowed for a single prompt.
    pub max_iterations: usize,
}

/// One tool invocation made while answering.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AgentStep {
    pub tool: String,
    pub args: Value,
    pub observation: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentResult {
    /// Summed over every model call.
    pub tokens: TokenUsage,
    /// Final answer, or the output of a `return_direct` tool.
    pub generation: String,
    #[serde(default)]
    pub steps: Vec<AgentStep>,
    pub iterations: usize,
}

pub type AgentExecuteResult = Result<AgentResult, AgentError>;
