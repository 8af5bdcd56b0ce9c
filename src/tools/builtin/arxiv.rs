use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::truncate_chars;
use crate::config::ToolSettings;
use crate::tools::{ArgSchema, ErrorHandling, Tool, ToolError};

const NAME: &str = "arxiv";
const DEFAULT_API_URL: &str = "http://export.arxiv.org/api/query";
const NO_RESULT: &str = "No good Arxiv Result was found";

/// Paper metadata from the arXiv export API.
#[derive(Debug, Clone)]
pub struct ArxivTool {
    client: reqwest::Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
    handle_error: ErrorHandling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Paper {
    published: String,
    title: String,
    authors: Vec<String>,
    summary: String,
}

/// Atom feed as returned by the export API; unknown elements are ignored.
#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    published: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Vec<Author>,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

impl ArxivTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
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

    async fn fetch(&self, query: &str) -> Result<String, reqwest::Error> {
        let max_results = self.top_k.to_string();
        self.client
            .get(&self.api_url)
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait::async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "A wrapper around Arxiv.org. Useful for when you need to answer questions \
         about Physics, Mathematics, Computer Science, Quantitative Biology, \
         Quantitative Finance, Statistics, Electrical Engineering, and Economics \
         from scientific articles on arxiv.org. Input should be a search query."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::string("query", "search query for arxiv.org")]
    }

    fn handle_error(&self) -> ErrorHandling {
        self.handle_error.clone()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| ToolError::ParamsNotMatched("query must be a string".into()))?;
        let feed = self
            .fetch(query)
            .await
            .map_err(|e| ToolError::execution(NAME, e))?;
        let papers = parse_feed(&feed).map_err(|e| ToolError::execution(NAME, e))?;
        debug!("arxiv query {:?} returned {} entries", query, papers.len());

        if papers.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        let docs: Vec<String> = papers
            .iter()
            .take(self.top_k)
            .map(|p| {
                format!(
                    "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                    p.published,
                    p.title,
                    p.authors.join(", "),
                    p.summary
                )
            })
            .collect();
        Ok(truncate_chars(&docs.join("\n\n"), self.max_chars))
    }
}

fn parse_feed(feed: &str) -> Result<Vec<Paper>, quick_xml::DeError> {
    let feed: Feed = quick_xml::de::from_str(feed)?;
    Ok(feed
        .entry
        .into_iter()
        .map(|entry| Paper {
            published: entry.published.trim().chars().take(10).collect(),
            title: collapse_whitespace(&entry.title),
            authors: entry
                .author
                .into_iter()
                .map(|a| collapse_whitespace(&a.name))
                .filter(|name| !name.is_empty())
                .collect(),
            summary: collapse_whitespace(&entry.summary),
        })
        .collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:react</title>
  <entry>
    <id>http://arxiv.org/abs/2210.03629v3</id>
    <published>2022-10-06T01:00:32Z</published>
    <title>ReAct: Synergizing Reasoning and Acting in
      Language Models</title>
    <summary>  While large language models have demonstrated
 impressive capabilities &amp; more.
    </summary>
    <author><name>Shunyu Yao</name></author>
    <author><name>Jeffrey Zhao</name></author>
    <link href="http://arxiv.org/abs/2210.03629v3" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_atom_entries() {
        let papers = parse_feed(FEED).unwrap();
        assert_eq!(
            papers,
            vec![Paper {
                published: "2022-10-06".into(),
                title: "ReAct: Synergizing Reasoning and Acting in Language Models".into(),
                authors: vec!["Shunyu Yao".into(), "Jeffrey Zhao".into()],
                summary: "While large language models have demonstrated impressive capabilities & more."
                    .into(),
            }]
        );
    }

    #[test]
    fn empty_feed_has_no_entries() {
        assert!(parse_feed("<feed><title>nothing</title></feed>").unwrap().is_empty());
    }

    #[test]
    fn decodes_character_references_and_cdata() {
        let feed = "<feed><entry>\
            <published>2024-01-02T00:00:00Z</published>\
            <title>Caf&#233; &#x27;s</title>\
            <summary><![CDATA[a < b]]></summary>\
            <author><name>Ana &amp; Bo</name></author>\
            </entry></feed>";
        let papers = parse_feed(feed).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Caf\u{e9} 's");
        assert_eq!(papers[0].summary, "a < b");
        assert_eq!(papers[0].authors, vec!["Ana & Bo".to_string()]);
        assert_eq!(papers[0].published, "2024-01-02");
    }

    #[test]
    fn malformed_feed_is_an_error() {
        assert!(parse_feed("<feed><entry><title>open").is_err());
    }

    #[tokio::test]
    async fn formats_papers_from_api() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::UrlEncoded("search_query".into(), "react agents".into()))
            .with_header("content-type", "application/atom+xml")
            .with_body(FEED)
            .create_async()
            .await;

        let tool = ArxivTool::new(reqwest::Client::new(), &ToolSettings::default())
            .with_api_url(format!("{}/api/query", server.url()));
        let out = tool.invoke(json!("react agents")).await.unwrap();
        assert!(out.starts_with("Published: 2022-10-06\nTitle: ReAct: Synergizing"));
        assert!(out.contains("Authors: Shunyu Yao, Jeffrey Zhao"));
    }
}
