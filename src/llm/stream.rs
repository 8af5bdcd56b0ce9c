use serde::{Serialize, Deserialize};
use serde_json::Value;

use super::tokens::TokenUsage;

/// One chunk of a streamed generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StreamData {
    /// Raw provider payload for this chunk.
    pub value: Value,
    /// Usage, when the provider reports it (usually on the last chunk).
    pub tokens: Option<TokenUsage>,
    pub content: String,
}

impl StreamData {
    pub fn new(value: Value, tokens: Option<TokenUsage>, content: impl Into<String>) -> Self {
        Self {
            value,
            tokens,
            content: content.into(),
        }
    }
}
