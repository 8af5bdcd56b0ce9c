use crate::agent::error::AgentError;
use crate::config::ConfigError;
use crate::llm::error::LLMError;
use crate::tools::error::ToolError;

/// Any failure surfaced by this crate, for callers that do not care which
/// layer produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_errors_convert_into_crate_error() {
        let err: Error = ToolError::execution("search", "offline").into();
        assert!(matches!(err, Error::Tool(_)));
        assert_eq!(
            err.to_string(),
            "Tool error: Tool execution error in 'search': offline"
        );
    }

    #[test]
    fn agent_errors_keep_their_source_message() {
        let err: Error = AgentError::MaxIterationsExceeded(3).into();
        assert_eq!(err.to_string(), "Agent error: No final answer after 3 iteration(s)");
    }
}
