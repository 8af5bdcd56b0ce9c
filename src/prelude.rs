pub use crate::agent::{
    callback::{AgentCallback, TracingCallback},
    memory::ChatMemory,
    strategy::Strategy,
    traits::AgentRunner,
    types::{Agent, AgentResult, AgentStep},
};
pub use crate::llm::{traits::LLM, prompt::PromptTemplate, GenerateResult, CallInfo};
pub use crate::message::Message;
pub use crate::tools::{
    ArgSchema, ErrorHandling, StructuredTool, Tool, ToolError, ToolSchema,
};
pub use crate::tool;
