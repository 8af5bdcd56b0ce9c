use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::truncate_chars;
use crate::config::ToolSettings;
use crate::tools::{ArgSchema, ErrorHandling, Tool, ToolError};

const NAME: &str = "wikipedia";
const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Page summaries from the MediaWiki API.
#[derive(Debug, Clone)]
pub struct WikipediaTool {
    client: reqwest::Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
    handle_error: ErrorHandling,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            api_url: format!("https://{}.wikipedia.org/w/api.php", settings.wikipedia_lang),
            top_k: settings.top_k_results,
            max_chars: settings.max_chars,
            handle_error: ErrorHandling::Propagate,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_error_handling(mut self, handling: impl Into<ErrorHandling>) -> Self {
        self.handle_error = handling.into();
        self
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, reqwest::Error> {
        let limit = self.top_k.to_string();
        let resp: SearchResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp
            .query
            .map(|q| q.search.into_iter().map(|h| h.title).collect())
            .unwrap_or_default())
    }

    async fn summary(&self, title: &str) -> Result<Option<String>, reqwest::Error> {
        let resp: ExtractResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", title),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp
            .query
            .and_then(|q| q.pages.into_values().find_map(|p| p.extract))
            .filter(|s| !s.trim().is_empty()))
    }
}

#[async_trait::async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general \
         questions about people, places, companies, facts, historical events, or \
         other subjects. Input should be a search query."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::string("query", "query to look up on Wikipedia")]
    }

    fn handle_error(&self) -> ErrorHandling {
        self.handle_error.clone()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| ToolError::ParamsNotMatched("query must be a string".into()))?;
        let titles = self
            .search_titles(query)
            .await
            .map_err(|e| ToolError::execution(NAME, e))?;
        debug!("wikipedia query {:?} matched {} page(s)", query, titles.len());

        let mut docs = Vec::new();
        for title in titles.iter().take(self.top_k) {
            let summary = self
                .summary(title)
                .await
                .map_err(|e| ToolError::execution(NAME, e))?;
            if let Some(summary) = summary {
                docs.push(format!("Page: {}\nSummary: {}", title, summary.trim()));
            }
        }

        if docs.is_empty() {
            Ok(NO_RESULT.to_string())
        } else {
            Ok(truncate_chars(&docs.join("\n\n"), self.max_chars))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn tool(server: &mockito::Server, settings: &ToolSettings) -> WikipediaTool {
        WikipediaTool::new(reqwest::Client::new(), settings)
            .with_api_url(format!("{}/w/api.php", server.url()))
    }

    #[tokio::test]
    async fn searches_then_summarizes_each_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srsearch".into(), "Ferris crab".into()),
            ]))
            .with_body(
                json!({ "query": { "search": [ { "title": "Rust (programming language)" } ] } })
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prop".into(), "extracts".into()),
                Matcher::UrlEncoded("titles".into(), "Rust (programming language)".into()),
            ]))
            .with_body(
                json!({ "query": { "pages": { "123": { "extract": "Rust is a language.\n" } } } })
                    .to_string(),
            )
            .create_async()
            .await;

        let out = tool(&server, &ToolSettings::default())
            .invoke(json!("Ferris crab"))
            .await
            .unwrap();
        assert_eq!(out, "Page: Rust (programming language)\nSummary: Rust is a language.");
    }

    #[tokio::test]
    async fn no_hits_reports_no_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_body(json!({ "query": { "search": [] } }).to_string())
            .create_async()
            .await;
        let out = tool(&server, &ToolSettings::default()).invoke(json!("qqqq")).await.unwrap();
        assert_eq!(out, NO_RESULT);
    }

    #[tokio::test]
    async fn output_is_truncated_to_max_chars() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("list".into(), "search".into()))
            .with_body(json!({ "query": { "search": [ { "title": "A" } ] } }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("prop".into(), "extracts".into()))
            .with_body(json!({ "query": { "pages": { "1": { "extract": "x".repeat(100) } } } }).to_string())
            .create_async()
            .await;

        let settings = ToolSettings { max_chars: 20, ..ToolSettings::default() };
        let out = tool(&server, &settings).invoke(json!("A")).await.unwrap();
        assert_eq!(out.chars().count(), 20);
        assert!(out.starts_with("Page: A\nSummary: "));
    }
}
