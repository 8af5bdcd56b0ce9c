// Chat completions through async-openai; tool calls travel in the text protocol
// shared with the other backends.
pub use async_openai::{
    Client, config::OpenAIConfig
};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_stream::stream as async_stream;
use futures::{
    FutureExt,
    StreamExt,
    future::BoxFuture,
    stream::BoxStream
};
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::message::{Message, MessageRole};
use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    stream::StreamData,
    error::LLMError,
    GenerateResult,
    LLMResult,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// A unique identifier representing your end-user, which will help OpenAI to monitor and detect abuse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            user: None,
        }
    }
}

pub struct OpenAI{
    pub client:Client<OpenAIConfig>,
    pub options:CompletionOptions,
}

impl OpenAI {
    /// Client configured from the `OPENAI_API_KEY` environment variable.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.options.model = model.into();
        self
    }

    fn build_request(&self, messages: &[Message], stream: bool) -> LLMResult<CreateChatCompletionRequest> {
        let mapped = messages
            .iter()
            .map(to_openai_message)
            .collect::<LLMResult<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.options.model.clone()).messages(mapped);
        if let Some(max_tokens) = self.options.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = self.options.temperature {
            args.temperature(temperature);
        }
        if let Some(user) = &self.options.user {
            args.user(user.clone());
        }
        if stream {
            args.stream(true);
        }
        Ok(args.build()?)
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new()
    }
}

fn to_openai_message(message: &Message) -> LLMResult<ChatCompletionRequestMessage> {
    let msg = match message.role {
        MessageRole::System | MessageRole::Developer => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        // Native tool messages need a tool_call_id; observations go back as user turns.
        MessageRole::ToolResponse => {
            let name = message.name.as_deref().unwrap_or("tool");
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Observation from {}: {}", name, message.content))
                .build()?
                .into()
        }
    };
    Ok(msg)
}

impl LLM for OpenAI {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let request = self.build_request(messages, false)?;
            debug!("openai chat request: model={} messages={}", self.options.model, messages.len());
            let response = self.client.chat().create(request).await?;

            let tokens = response
                .usage
                .map(|u| TokenUsage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default();
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LLMError::InvalidResponse("no choices returned".into()))?;
            let generation = choice.message.content.unwrap_or_default();

            Ok(GenerateResult::from_generation(generation, tokens))
        }
        .boxed()
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>> {
        let s = async_stream! {
            let request = match self.build_request(messages, true) {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let mut upstream = match self.client.chat().create_stream(request).await {
                Ok(s) => s,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => {
                        let content: String = chunk
                            .choices
                            .iter()
                            .filter_map(|c| c.delta.content.as_deref())
                            .collect();
                        let tokens = chunk.usage.as_ref().map(|u| TokenUsage {
                            prompt_tokens: u.prompt_tokens,
                            completion_tokens: u.completion_tokens,
                            total_tokens: u.total_tokens,
                        });
                        let value = serde_json::to_value(&chunk).unwrap_or_default();
                        yield Ok(StreamData::new(value, tokens, content));
                    }
                    Err(e) => yield Err(e.into()),
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
    fn builds_request_with_options() {
        let llm = OpenAI::with_api_key("sk-test").with_options(CompletionOptions {
            model: "gpt-4-0613".into(),
            max_tokens: Some(128),
            temperature: Some(0.5),
            user: None,
        });
        let request = llm
            .build_request(&[Message::system("be brief"), Message::user("hi")], false)
            .unwrap();
        assert_eq!(request.model, "gpt-4-0613");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_completion_tokens, Some(128));
    }

    #[test]
    fn tool_observations_become_user_turns() {
        let msg = to_openai_message(&Message::tool_res("wikipedia", "Page: Rust")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::User(_)));
    }
}
