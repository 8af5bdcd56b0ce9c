//! Local models served by Ollama.

use std::sync::Arc;

use async_stream::stream as async_stream;
use futures::{future::BoxFuture, stream::BoxStream, FutureExt};
use tracing::debug;

use crate::llm::{
    error::LLMError, stream::StreamData, tokens::TokenUsage, traits::LLM, GenerateResult, LLMResult,
};
use crate::message::{Message, MessageRole as MsgRole};

/// Model used unless [`Ollama::with_model`] picks another; must be pulled locally.
pub const DEFAULT_MODEL: &str = "llama3.2";

pub use ollama_rs::{
    error::OllamaError,
    generation::chat::{request::ChatMessageRequest, ChatMessage, ChatMessageResponse, MessageRole},
    models::ModelOptions,
    Ollama as OllamaClient,
};

#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) model: String,
    pub(crate) options: Option<ModelOptions>,
    pub(crate) think: bool,
}

impl Ollama {
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            options: None,
            think: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sampling options such as temperature or context size.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Ask reasoning models to think before answering.
    pub fn with_think(mut self, think: bool) -> Self {
        self.think = think;
        self
    }

    fn chat_request(&self, messages: &[Message]) -> ChatMessageRequest {
        let history = messages.iter().map(ChatMessage::from).collect();
        let mut request = ChatMessageRequest::new(self.model.clone(), history);
        if let Some(options) = &self.options {
            request = request.options(options.clone());
        }
        if self.think {
            request = request.think(true);
        }
        request
    }
}

impl Default for Ollama {
    /// Client for `http://localhost:11434`.
    fn default() -> Self {
        Ollama::new(Arc::new(OllamaClient::default()))
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MsgRole::System | MsgRole::Developer => MessageRole::System,
            MsgRole::User => MessageRole::User,
            MsgRole::Assistant => MessageRole::Assistant,
            MsgRole::ToolResponse => MessageRole::Tool,
        };
        ChatMessage::new(role, message.content.clone())
    }
}

fn usage(response: &ChatMessageResponse) -> Option<TokenUsage> {
    response
        .final_data
        .as_ref()
        .map(|data| TokenUsage::new(data.prompt_eval_count as u32, data.eval_count as u32))
}

fn to_chunk(response: ChatMessageResponse) -> StreamData {
    let tokens = usage(&response);
    let value = serde_json::to_value(&response.message).unwrap_or_default();
    StreamData::new(value, tokens, response.message.content)
}

impl LLM for Ollama {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            debug!("ollama chat request: model={} messages={}", self.model, messages.len());
            let response = self.client.send_chat_messages(self.chat_request(messages)).await?;
            let tokens = usage(&response).unwrap_or_default();
            Ok(GenerateResult::from_generation(response.message.content, tokens))
        }
        .boxed()
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>> {
        let s = async_stream! {
            let request = self.chat_request(messages);

            #[cfg(feature = "ollama_stream")]
            {
                use futures::StreamExt;

                let upstream = match self.client.send_chat_messages_stream(request).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(LLMError::from(e));
                        return;
                    }
                };
                futures::pin_mut!(upstream);
                while let Some(item) = upstream.next().await {
                    match item {
                        Ok(response) => yield Ok(to_chunk(response)),
                        Err(e) => yield Err(LLMError::InvalidResponse(format!("{:?}", e))),
                    }
                }
            }

            // without upstream streaming the whole reply is one chunk
            #[cfg(not(feature = "ollama_stream"))]
            {
                match self.client.send_chat_messages(request).await {
                    Ok(response) => yield Ok(to_chunk(response)),
                    Err(e) => yield Err(LLMError::from(e)),
                }
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_roles_onto_ollama_roles() {
        let msg = ChatMessage::from(&Message::developer("protocol"));
        assert!(matches!(msg.role, MessageRole::System));
        let msg = ChatMessage::from(&Message::tool_res("calculator", "4"));
        assert!(matches!(msg.role, MessageRole::Tool));
        assert_eq!(msg.content, "4");
    }

    #[test]
    fn builder_overrides_model() {
        let ollama = Ollama::default().with_model("qwen3:8b").with_think(true);
        assert_eq!(ollama.model, "qwen3:8b");
        assert!(ollama.think);
    }
}
