

use super::types::AgentExecuteResult;

/// Trait describing runtime operations an agent can perform.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    /// Answer `prompt`, calling tools as the model asks, and return the final
    /// generation.
    async fn call_llm(&self, prompt: &str) -> AgentExecuteResult;
}
