use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ToolSettings;
use crate::tools::{ArgSchema, ErrorHandling, Tool, ToolError};

const NAME: &str = "ddg-search";
const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com/";
const NO_RESULT: &str = "No good DuckDuckGo Search Result was found";

/// Web search through the DuckDuckGo instant-answer API.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearchTool {
    client: reqwest::Client,
    base_url: String,
    top_k: usize,
    handle_error: ErrorHandling,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InstantAnswer {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    answer: Value,
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RelatedTopic {
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    /// Present on topic groups instead of `text`.
    topics: Vec<RelatedTopic>,
}

impl DuckDuckGoSearchTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            top_k: settings.top_k_results,
            handle_error: ErrorHandling::Propagate,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_error_handling(mut self, handling: impl Into<ErrorHandling>) -> Self {
        self.handle_error = handling.into();
        self
    }

    async fn search(&self, query: &str) -> Result<InstantAnswer, reqwest::Error> {
        self.client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<InstantAnswer>()
            .await
    }

    fn render(&self, answer: &InstantAnswer) -> String {
        let mut parts = Vec::new();
        if let Some(text) = answer.answer.as_str().filter(|s| !s.is_empty()) {
            parts.push(format!("Answer: {}", text));
        }
        if !answer.abstract_text.is_empty() {
            let mut line = if answer.heading.is_empty() {
                answer.abstract_text.clone()
            } else {
                format!("{}: {}", answer.heading, answer.abstract_text)
            };
            if !answer.abstract_url.is_empty() {
                line.push_str(&format!(" ({})", answer.abstract_url));
            }
            parts.push(line);
        }
        let topics = answer
            .related_topics
            .iter()
            .flat_map(|t| if t.topics.is_empty() { std::slice::from_ref(t) } else { &t.topics[..] })
            .filter_map(|t| {
                let text = t.text.as_deref().filter(|s| !s.is_empty())?;
                Some(match &t.first_url {
                    Some(url) => format!("{} ({})", text, url),
                    None => text.to_string(),
                })
            })
            .take(self.top_k);
        parts.extend(topics);

        if parts.is_empty() {
            NO_RESULT.to_string()
        } else {
            parts.join("\n")
        }
    }
}

#[async_trait::async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "A wrapper around DuckDuckGo Search. Useful for when you need to answer \
         questions about current events. Input should be a search query."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::string("query", "search query to look up")]
    }

    fn handle_error(&self) -> ErrorHandling {
        self.handle_error.clone()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| ToolError::ParamsNotMatched("query must be a string".into()))?;
        debug!("duckduckgo query: {}", query);
        let answer = self
            .search(query)
            .await
            .map_err(|e| ToolError::execution(NAME, e))?;
        Ok(self.render(&answer))
    }
}
