use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::llm::stream::StreamData;
use crate::llm::{GenerateResult, LLMResult};
use crate::message::Message;

/// A chat model the agent can drive.
///
/// Futures and streams borrow `messages` for `'a`, so backends never have to
/// clone the conversation to call out.
pub trait LLM: Send + Sync {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>>;

    /// Incremental output. Backends without native streaming yield one chunk.
    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>>;

    /// Single-prompt convenience: one user message, text back.
    fn invoke<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, LLMResult<String>> {
        Box::pin(async move {
            let messages = [Message::user(prompt)];
            Ok(self.generate(&messages).await?.generation)
        })
    }
}
