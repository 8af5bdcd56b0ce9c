//! Text-generation models served by the Hugging Face inference API.

use futures::{
    FutureExt,
    future::BoxFuture,
    stream::{self, BoxStream, StreamExt},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::HUGGINGFACEHUB_API_TOKEN;
use crate::message::Message;
use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    stream::StreamData,
    error::LLMError,
    GenerateResult,
    LLMResult,
};

pub const DEFAULT_REPO_ID: &str = "mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Debug, Clone, Serialize)]
struct Parameters {
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Generated>),
    Single(Generated),
    Error { error: String },
}

#[derive(Debug, Clone)]
pub struct HuggingFaceEndpoint {
    client: reqwest::Client,
    base_url: String,
    repo_id: String,
    token: Option<String>,
    max_new_tokens: u32,
    temperature: Option<f32>,
}

impl HuggingFaceEndpoint {
    /// Endpoint for `repo_id`, authenticated with `HUGGINGFACEHUB_API_TOKEN`
    /// when it is set.
    pub fn new(repo_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            repo_id: repo_id.into(),
            token: std::env::var(HUGGINGFACEHUB_API_TOKEN).ok().filter(|t| !t.is_empty()),
            max_new_tokens: 128,
            temperature: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.repo_id)
    }

    async fn complete(&self, prompt: String) -> LLMResult<String> {
        let token = self
            .token
            .as_deref()
            .ok_or(LLMError::MissingApiKey(HUGGINGFACEHUB_API_TOKEN))?;
        let body = json!({
            "inputs": prompt,
            "parameters": Parameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
        });
        debug!("huggingface request: repo={}", self.repo_id);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LLMError::RateLimitExceeded(response.text().await.unwrap_or_default()));
        }
        let text = response.text().await?;
        let parsed: InferenceResponse = serde_json::from_str(&text).map_err(|_| {
            LLMError::InvalidResponse(format!("status {}: {}", status, text))
        })?;
        match parsed {
            InferenceResponse::Batch(mut batch) if !batch.is_empty() => {
                Ok(batch.swap_remove(0).generated_text)
            }
            InferenceResponse::Batch(_) => Err(LLMError::InvalidResponse("empty generation".into())),
            InferenceResponse::Single(g) => Ok(g.generated_text),
            InferenceResponse::Error { error } => Err(LLMError::InvalidResponse(error)),
        }
    }
}

/// Flatten a chat into a single completion prompt.
fn render_prompt(messages: &[Message]) -> String {
    // A lone user message is sent as-is, like a plain completion call.
    if let [only] = messages {
        if only.speaker() == "human" {
            return only.content.clone();
        }
    }
    let mut prompt = String::new();
    for m in messages {
        let label = match m.speaker() {
            "human" => "Human".to_string(),
            "ai" => "AI".to_string(),
            "tool" => format!("Observation ({})", m.name.as_deref().unwrap_or("tool")),
            _ => "System".to_string(),
        };
        prompt.push_str(&format!("{}: {}\n", label, m.content));
    }
    prompt.push_str("AI:");
    prompt
}

impl LLM for HuggingFaceEndpoint {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let generation = self.complete(render_prompt(messages)).await?;
            // The inference API does not report usage.
            Ok(GenerateResult::from_generation(generation.trim(), TokenUsage::default()))
        }
        .boxed()
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>> {
        stream::once(async move {
            let generation = self.complete(render_prompt(messages)).await?;
            Ok(StreamData::new(json!({ "generated_text": generation }), None, generation))
        })
        .boxed()
    }
}
