pub mod secrets;
pub mod settings;

pub use secrets::{Secrets, HUGGINGFACEHUB_API_TOKEN, OPENAI_API_KEY, SECRET_KEYS};
pub use settings::{AgentSettings, LlmSettings, Provider, Settings, ToolSettings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Env file error: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
