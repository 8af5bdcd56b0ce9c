//! Model backends and the text protocol they share for tool calls.

pub mod error;
pub mod fake;
pub mod huggingface;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod stream;
pub mod tokens;
pub mod traits;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use tokens::TokenUsage;

/// One model reply.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateResult {
    pub tokens: TokenUsage,
    /// Raw reply text, tool-call JSON included.
    pub generation: String,
    /// Tool calls found in `generation`; empty means a final answer.
    #[serde(default)]
    pub tool_calls: Vec<CallInfo>,
}

impl GenerateResult {
    /// Build a result from raw model text, picking up any tool calls in it.
    pub fn from_generation(generation: impl Into<String>, tokens: TokenUsage) -> Self {
        let generation = generation.into();
        let tool_calls = parse_tool_calls(&generation);
        Self { tokens, generation, tool_calls }
    }
}

/// A tool the model asked to run, with the arguments to pass.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallInfo {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

pub type LLMResult<T> = std::result::Result<T, error::LLMError>;

/// Extract `{"tool_calls": [{"name": .., "args": ..}]}` from model text.
///
/// The JSON may be the whole text or embedded in surrounding prose or a code
/// fence; entries without a string `name` are skipped and a missing `args`
/// becomes `{}`.
pub fn parse_tool_calls(text: &str) -> Vec<CallInfo> {
    let Some(calls) = find_tool_calls(text) else {
        return Vec::new();
    };
    calls
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?.to_string();
            let args = entry
                .get("args")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}));
            Some(CallInfo { name, args })
        })
        .collect()
}

/// The first JSON object in `text` carrying a `tool_calls` array, trying each
/// `{` as a start so braces in the prose before it are skipped.
fn find_tool_calls(text: &str) -> Option<Vec<JsonValue>> {
    text.match_indices('{').find_map(|(start, _)| {
        let value = serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<JsonValue>()
            .next()?
            .ok()?;
        match value {
            JsonValue::Object(mut object) => match object.remove("tool_calls")? {
                JsonValue::Array(calls) => Some(calls),
                _ => None,
            },
            _ => None,
        }
    })
}
