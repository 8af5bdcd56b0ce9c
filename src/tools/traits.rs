use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use super::error::{ErrorHandling, ToolError};
use super::input;
use super::schema::{ArgSchema, ToolSchema};

/// A named, described unit of work an agent may call.
///
/// Implement `run` with the body; callers should go through [`Tool::invoke`],
/// which shapes and checks the input and applies [`Tool::handle_error`].
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn args(&self) -> Vec<ArgSchema> {
        Vec::new()
    }

    /// When true the agent hands this tool's output straight back to its
    /// caller instead of feeding it to the model.
    fn return_direct(&self) -> bool {
        false
    }

    fn handle_error(&self) -> ErrorHandling {
        ErrorHandling::Propagate
    }

    async fn run(&self, input: Value) -> Result<String, ToolError>;

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args: self.args(),
            return_direct: self.return_direct(),
        }
    }

    async fn invoke(&self, input: Value) -> Result<String, ToolError> {
        let args = self.args();
        let input = input::normalize(&args, input);
        input::validate(self.name(), &args, &input)?;
        match self.run(input).await {
            Ok(output) => Ok(output),
            Err(err) => {
                let policy = self.handle_error();
                if policy.is_enabled() && err.is_recoverable() {
                    warn!("tool {} failed, returning message: {}", self.name(), err);
                }
                policy.apply(err)
            }
        }
    }
}

/// Check the descriptor invariants: non-empty name and description, and every
/// argument named, described, and unique.
pub fn validate_descriptor(tool: &dyn Tool) -> Result<(), ToolError> {
    if tool.name().trim().is_empty() {
        return Err(ToolError::InvalidDescriptor("tool name is empty".into()));
    }
    if tool.description().trim().is_empty() {
        return Err(ToolError::InvalidDescriptor(format!(
            "tool '{}' has an empty description",
            tool.name()
        )));
    }
    let mut seen = HashSet::new();
    for arg in tool.args() {
        if arg.name.trim().is_empty() {
            return Err(ToolError::InvalidDescriptor(format!(
                "tool '{}' has an unnamed argument",
                tool.name()
            )));
        }
        if arg.description.trim().is_empty() {
            return Err(ToolError::InvalidDescriptor(format!(
                "argument '{}' of tool '{}' has no description",
                arg.name,
                tool.name()
            )));
        }
        if !seen.insert(arg.name.clone()) {
            return Err(ToolError::InvalidDescriptor(format!(
                "tool '{}' declares argument '{}' twice",
                tool.name(),
                arg.name
            )));
        }
    }
    Ok(())
}
