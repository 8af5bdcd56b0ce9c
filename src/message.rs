use serde::{Deserialize, Serialize};

/// Who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Observation returned by a tool call.
    ToolResponse,
    /// Instructions from the application rather than the end user.
    Developer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Tool that produced a [`MessageRole::ToolResponse`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), name: None }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// Observation produced by running the named tool.
    pub fn tool_res(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::with_role(MessageRole::ToolResponse, content)
        }
    }

    pub fn developer(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Developer, content)
    }

    /// Chat-transcript speaker label: `human`, `ai`, `tool` or `system`.
    pub fn speaker(&self) -> &'static str {
        match self.role {
            MessageRole::User => "human",
            MessageRole::Assistant => "ai",
            MessageRole::ToolResponse => "tool",
            MessageRole::System | MessageRole::Developer => "system",
        }
    }
}
