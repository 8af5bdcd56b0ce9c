use crate::llm::error::LLMError;
use crate::tools::error::ToolError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The model asked for a tool that is not registered.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool failed and its error handling let the failure through.
    #[error("Tool execution error: {0}")]
    ToolExecutionError(#[from] ToolError),

    /// Registration refused a malformed descriptor.
    #[error("Invalid tool: {0}")]
    InvalidTool(ToolError),

    #[error("LLM error: {0}")]
    LLMExecutionError(#[from] LLMError),

    #[error("No final answer after {0} iteration(s)")]
    MaxIterationsExceeded(usize),
}
