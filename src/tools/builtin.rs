//! Ready-made tools, loadable by the names an agent configuration uses.

pub mod arxiv;
pub mod calculator;
pub mod ddg_search;
pub mod wikipedia;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::error::ToolError;
use super::traits::Tool;
use crate::config::ToolSettings;

pub use arxiv::ArxivTool;
pub use calculator::CalculatorTool;
pub use ddg_search::DuckDuckGoSearchTool;
pub use wikipedia::WikipediaTool;

/// Names accepted by [`load_tools`].
pub const TOOL_NAMES: [&str; 4] = ["ddg-search", "wikipedia", "arxiv", "calculator"];

/// Build the named tools. Unknown names fail with [`ToolError::ToolNotFound`].
pub fn load_tools<S: AsRef<str>>(
    names: &[S],
    settings: &ToolSettings,
) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
    let client = http_client(settings)?;
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            debug!("loading tool {}", name);
            let tool: Arc<dyn Tool> = match name {
                "ddg-search" => Arc::new(DuckDuckGoSearchTool::new(client.clone(), settings)),
                "wikipedia" => Arc::new(WikipediaTool::new(client.clone(), settings)),
                "arxiv" => Arc::new(ArxivTool::new(client.clone(), settings)),
                "calculator" | "llm-math" => Arc::new(CalculatorTool::default()),
                other => return Err(ToolError::ToolNotFound(other.to_string())),
            };
            Ok(tool)
        })
        .collect()
}

pub(crate) fn http_client(settings: &ToolSettings) -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(concat!("tool-agent/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ToolError::HttpClient)
}

/// Cut `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
