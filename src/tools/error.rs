use std::fmt;
use std::sync::Arc;


#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The tool body could not complete. This is the recoverable failure that
    /// [`ErrorHandling`] may turn into a message.
    #[error("Tool execution error in '{name}': {reason}")]
    ExecutionError {
        name: String,
        reason: String,
    },

    #[error("Tool parameters do not match: {0}")]
    ParamsNotMatched(String),

    #[error("Invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    /// The shared HTTP client for the built-in tools could not be set up.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ToolError {
    pub fn execution(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ExecutionError {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure came from the tool body rather than from bad input
    /// or a misconfigured tool.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExecutionError { .. })
    }
}

/// What to do when a tool body fails with [`ToolError::ExecutionError`].
#[derive(Clone, Default)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Replace the error with its reason text.
    Message,
    /// Replace the error with a fixed message.
    Fixed(String),
    Custom(Arc<dyn Fn(&ToolError) -> String + Send + Sync>),
}

impl ErrorHandling {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ToolError) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Propagate)
    }

    /// Apply the policy. Only recoverable errors are ever converted.
    pub fn apply(&self, err: ToolError) -> Result<String, ToolError> {
        if !err.is_recoverable() {
            return Err(err);
        }
        match self {
            Self::Propagate => Err(err),
            Self::Message => Ok(match &err {
                ToolError::ExecutionError { reason, .. } => reason.clone(),
                other => other.to_string(),
            }),
            Self::Fixed(msg) => Ok(msg.clone()),
            Self::Custom(f) => Ok(f(&err)),
        }
    }
}

impl fmt::Debug for ErrorHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Propagate => f.write_str("Propagate"),
            Self::Message => f.write_str("Message"),
            Self::Fixed(msg) => f.debug_tuple("Fixed").field(msg).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<bool> for ErrorHandling {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Message } else { Self::Propagate }
    }
}

impl From<&str> for ErrorHandling {
    fn from(msg: &str) -> Self {
        Self::Fixed(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_failures_are_not_recoverable() {
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = ToolError::HttpClient(source);
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("Failed to build HTTP client"));
        // never swallowed by a conversion policy
        assert!(matches!(ErrorHandling::Message.apply(err), Err(ToolError::HttpClient(_))));
    }

    #[test]
    fn propagate_returns_the_error() {
        let err = ErrorHandling::Propagate.apply(ToolError::execution("t", "boom"));
        assert!(matches!(err, Err(ToolError::ExecutionError { .. })));
    }

    #[test]
    fn message_returns_reason_text() {
        let out = ErrorHandling::Message.apply(ToolError::execution("t", "boom"));
        assert_eq!(out.unwrap(), "boom");
    }

    #[test]
    fn fixed_and_custom_messages() {
        let fixed = ErrorHandling::from("try again").apply(ToolError::execution("t", "boom"));
        assert_eq!(fixed.unwrap(), "try again");

        let custom = ErrorHandling::custom(|e| format!("handled: {}", e));
        assert_eq!(
            custom.apply(ToolError::execution("t", "boom")).unwrap(),
            "handled: Tool execution error in 't': boom"
        );
    }

    #[test]
    fn input_errors_are_never_converted() {
        let out = ErrorHandling::Message.apply(ToolError::ParamsNotMatched("missing query".into()));
        assert!(matches!(out, Err(ToolError::ParamsNotMatched(_))));
    }
}
