use super::ollama::OllamaError;


#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Ollama error: {0}")]
    OllamaError(#[from] OllamaError),

    #[error("OpenAI error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("Invalid prompt template: {0}")]
    InvalidTemplate(String),

    #[error("Missing prompt variable: {0}")]
    MissingVariable(String),
}
