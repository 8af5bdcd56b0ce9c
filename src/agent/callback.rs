use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::AgentResult;
use crate::llm::GenerateResult;
use crate::tools::ToolError;

/// Hooks called while an agent works on a prompt. All methods default to
/// doing nothing.
pub trait AgentCallback: Send + Sync {
    fn on_llm_end(&self, _iteration: usize, _result: &GenerateResult) {}
    fn on_tool_start(&self, _tool: &str, _args: &Value) {}
    fn on_tool_end(&self, _tool: &str, _output: &str) {}
    fn on_tool_error(&self, _tool: &str, _error: &ToolError) {}
    fn on_agent_finish(&self, _result: &AgentResult) {}
}

/// Reports agent progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCallback;

impl AgentCallback for TracingCallback {
    fn on_llm_end(&self, iteration: usize, result: &GenerateResult) {
        debug!(
            "iteration {}: {} tool call(s), {} tokens",
            iteration,
            result.tool_calls.len(),
            result.tokens.total_tokens
        );
    }

    fn on_tool_start(&self, tool: &str, args: &Value) {
        info!("calling tool {} with {}", tool, args);
    }

    fn on_tool_end(&self, tool: &str, output: &str) {
        debug!("tool {} returned {} chars", tool, output.len());
    }

    fn on_tool_error(&self, tool: &str, error: &ToolError) {
        warn!("tool {} failed: {}", tool, error);
    }

    fn on_agent_finish(&self, result: &AgentResult) {
        info!(
            "finished after {} iteration(s) and {} tool call(s), {} tokens",
            result.iterations,
            result.steps.len(),
            result.tokens.total_tokens
        );
    }
}
