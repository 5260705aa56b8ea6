//! Web-search collaborator: the `duckduckgo_search` tool and its client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tg_core::{Error, PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// One web-search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

/// The web-search backend.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error>;
}

/// Scrapes the DuckDuckGo HTML endpoint; no API key required.
pub struct DuckDuckGoClient {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("tg/0.1.0")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for DuckDuckGoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::tool("duckduckgo_search", format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::tool(
                "duckduckgo_search",
                format!("Search API error: {}", response.status()),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::tool("duckduckgo_search", format!("Failed to read response: {}", e)))?;

        Ok(parse_results(&html, max_results))
    }
}

/// Extract result titles and snippets from the DuckDuckGo HTML page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);

    let result_selector = Selector::parse("div.result").ok();
    let title_selector = Selector::parse("a.result__a").ok();
    let snippet_selector = Selector::parse("a.result__snippet, div.result__snippet").ok();

    let (Some(results), Some(titles), Some(snippets)) =
        (result_selector, title_selector, snippet_selector)
    else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for element in document.select(&results) {
        if hits.len() >= max_results {
            break;
        }

        let title = element
            .select(&titles)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let snippet = element
            .select(&snippets)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if title.is_empty() && snippet.is_empty() {
            continue;
        }

        hits.push(SearchHit { title, snippet });
    }

    hits
}

/// `duckduckgo_search` as a model-callable tool.
pub struct WebSearchTool {
    searcher: Arc<dyn WebSearcher>,
    default_max_results: usize,
}

impl WebSearchTool {
    pub fn new(searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            searcher,
            default_max_results: 5,
        }
    }
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

#[derive(Serialize)]
struct SearchResultPayload {
    status: String,
    results: Vec<SearchHit>,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date or missing information"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new()
                .add_property("query", PropertySchema::string("The search query"), true)
                .add_property(
                    "max_results",
                    PropertySchema::integer("Maximum number of results")
                        .with_default(serde_json::json!(self.default_max_results)),
                    false,
                ),
        )
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, Error> {
        let args: WebSearchArgs = serde_json::from_value(arguments)
            .map_err(|e| Error::tool("duckduckgo_search", format!("Invalid arguments: {}", e)))?;

        let max_results = args.max_results.unwrap_or(self.default_max_results);
        let results = self.searcher.search(&args.query, max_results).await?;

        let payload = SearchResultPayload {
            status: "success".to_string(),
            results,
        };
        let serialized = serde_json::to_string_pretty(&payload).map_err(|e| {
            Error::tool("duckduckgo_search", format!("Failed to serialize results: {}", e))
        })?;

        Ok(ToolOutput::success(serialized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE_HTML: &str = r#"
        <html><body>
        <div class="result">
            <a class="result__a" href="https://example.com/zoo">San Diego Zoo - Official Site</a>
            <a class="result__snippet">Buy tickets online. Adults $74, children $64.</a>
        </div>
        <div class="result">
            <a class="result__a" href="https://example.com/hours">Zoo Hours</a>
            <div class="result__snippet">Open daily 9am to 6pm.</div>
        </div>
        <div class="result"></div>
        </body></html>
    "#;

    struct StubSearcher {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl WebSearcher for StubSearcher {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error> {
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    #[test]
    fn test_parse_results() {
        let hits = parse_results(SAMPLE_HTML, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "San Diego Zoo - Official Site");
        assert!(hits[0].snippet.contains("$74"));
        assert_eq!(hits[1].snippet, "Open daily 9am to 6pm.");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let hits = parse_results(SAMPLE_HTML, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body></body></html>", 3).is_empty());
    }

    #[tokio::test]
    async fn test_web_search_tool_payload_shape() {
        let searcher = Arc::new(StubSearcher {
            hits: vec![SearchHit {
                title: "Madame Tussauds London".to_string(),
                snippet: "Tickets from £33.50".to_string(),
            }],
        });
        let tool = WebSearchTool::new(searcher);

        let output = tool
            .execute(json!({"query": "Madame Tussauds London tickets", "max_results": 3}))
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["results"][0]["title"], "Madame Tussauds London");
    }
}
