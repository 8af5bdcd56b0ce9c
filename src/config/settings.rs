//! TOML settings for the agent binary and the built-in tools.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::agent::strategy::Strategy;

/// Which model backend to talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Ollama,
    HuggingFace,
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "ollama" => Ok(Provider::Ollama),
            "huggingface" | "hf" => Ok(Provider::HuggingFace),
            other => Err(ConfigError::InvalidConfig(format!("unknown provider: {}", other))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provider::OpenAI => "openai",
            Provider::Ollama => "ollama",
            Provider::HuggingFace => "huggingface",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: Provider,
    /// Model name; `None` uses the provider's default.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAI,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentSettings {
    /// `zero-shot-react` or `plan-and-solve`.
    pub strategy: String,
    pub max_iterations: usize,
    /// Built-in tools to load by name.
    pub tools: Vec<String>,
    pub system_prompt: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::ZeroShotReact.to_string(),
            max_iterations: 10,
            tools: vec!["ddg-search".into(), "wikipedia".into()],
            system_prompt: None,
        }
    }
}

/// Settings for the built-in HTTP-backed tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolSettings {
    pub wikipedia_lang: String,
    /// Number of documents a search tool returns.
    pub top_k_results: usize,
    /// Character cap on a search tool's whole output.
    pub max_chars: usize,
    /// Seconds before an HTTP request made by a tool is abandoned.
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            wikipedia_lang: "en".to_string(),
            top_k_results: 3,
            max_chars: 4000,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_toml(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::InvalidConfig(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        self.strategy()?;
        if self.tools.top_k_results == 0 {
            return Err(ConfigError::InvalidConfig(
                "tools.top_k_results must be at least 1".into(),
            ));
        }
        if self.tools.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "tools.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        self.agent.strategy.parse()
    }
}
