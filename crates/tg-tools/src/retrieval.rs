//! Local retrieval (RAG) collaborator: the `search_rag` tool and its client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tg_core::{Error, PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters};

/// A retrieval match: raw text content, optional structured metadata, and a
/// relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Value,
    pub score: f64,
}

/// Alias kept for call sites that deal with the document alone.
pub type Document = ScoredDocument;

impl ScoredDocument {
    pub fn new(page_content: impl Into<String>, metadata: Value, score: f64) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
            score,
        }
    }

    /// The content to display for this document, chosen by a fixed
    /// preference order: the metadata `data` payload's `markdown` field,
    /// else a serialization of that payload, else raw `page_content`.
    pub fn preferred_content(&self) -> String {
        if let Some(data) = self.metadata.get("data") {
            // The payload is sometimes double-serialized as a JSON string.
            let payload = match data {
                Value::String(s) => serde_json::from_str::<Value>(s).unwrap_or(Value::Null),
                other => other.clone(),
            };

            match &payload {
                Value::Object(map) => {
                    if let Some(Value::String(markdown)) = map.get("markdown") {
                        return markdown.clone();
                    }
                    return payload.to_string();
                }
                Value::Null => {}
                other => return value_to_text(other),
            }
        }

        self.page_content.clone()
    }
}

/// Render a JSON value as display text: strings verbatim, lists joined by
/// newlines, everything else serialized.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// The retrieval backend. The index itself is an external collaborator;
/// this crate only defines the calling contract and an HTTP client for it.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, Error>;
}

/// HTTP client for a retrieval service exposing a single search route.
pub struct HttpRetriever {
    client: Client,
    endpoint: String,
}

impl HttpRetriever {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("tg/0.1.0")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest { query, k })
            .send()
            .await
            .map_err(|e| Error::tool("search_rag", format!("Retrieval request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::tool(
                "search_rag",
                format!("Retrieval API error: {}", response.status()),
            ));
        }

        response
            .json::<Vec<ScoredDocument>>()
            .await
            .map_err(|e| Error::tool("search_rag", format!("Failed to parse retrieval response: {}", e)))
    }
}

/// `search_rag` as a model-callable tool.
pub struct RetrievalTool {
    retriever: Arc<dyn Retriever>,
    default_k: usize,
}

impl RetrievalTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            default_k: 3,
        }
    }
}

#[derive(Deserialize)]
struct RetrievalArgs {
    query: String,
    #[serde(default)]
    k: Option<usize>,
}

/// Shape of a single match in the serialized tool result.
#[derive(Serialize)]
struct ResultEntry {
    content: String,
    score: f64,
    metadata: Value,
}

#[async_trait]
impl Tool for RetrievalTool {
    fn name(&self) -> &str {
        "search_rag"
    }

    fn description(&self) -> &str {
        "Search a local, curated knowledge base of travel and attraction data"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new()
                .add_property("query", PropertySchema::string("The search query"), true)
                .add_property(
                    "k",
                    PropertySchema::integer("Number of matches to return")
                        .with_default(serde_json::json!(self.default_k)),
                    false,
                ),
        )
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, Error> {
        let args: RetrievalArgs = serde_json::from_value(arguments)
            .map_err(|e| Error::tool("search_rag", format!("Invalid arguments: {}", e)))?;

        let k = args.k.unwrap_or(self.default_k);
        let matches = self.retriever.search(&args.query, k).await?;

        let entries: Vec<ResultEntry> = matches
            .into_iter()
            .map(|doc| ResultEntry {
                content: doc.page_content,
                score: doc.score,
                metadata: doc.metadata,
            })
            .collect();

        let serialized = serde_json::to_string_pretty(&entries)
            .map_err(|e| Error::tool("search_rag", format!("Failed to serialize results: {}", e)))?;

        Ok(ToolOutput::success(serialized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubRetriever {
        docs: Vec<ScoredDocument>,
    }

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<ScoredDocument>, Error> {
            Ok(self.docs.clone())
        }
    }

    #[test]
    fn test_preferred_content_markdown_wins() {
        let doc = ScoredDocument::new(
            "raw page content",
            json!({"data": {"markdown": "## Pricing\nAdults $30", "name": "Zoo"}}),
            0.9,
        );
        assert_eq!(doc.preferred_content(), "## Pricing\nAdults $30");
    }

    #[test]
    fn test_preferred_content_double_serialized_payload() {
        let doc = ScoredDocument::new(
            "raw",
            json!({"data": "{\"markdown\": \"from nested string\"}"}),
            0.5,
        );
        assert_eq!(doc.preferred_content(), "from nested string");
    }

    #[test]
    fn test_preferred_content_payload_dump_without_markdown() {
        let doc = ScoredDocument::new("raw", json!({"data": {"name": "Zoo"}}), 0.5);
        let content = doc.preferred_content();
        assert!(content.contains("\"name\""));
        assert!(content.contains("Zoo"));
    }

    #[test]
    fn test_preferred_content_falls_back_to_page_content() {
        let doc = ScoredDocument::new("just the raw text", json!({}), 0.1);
        assert_eq!(doc.preferred_content(), "just the raw text");

        let doc = ScoredDocument::new("also raw", Value::Null, 0.1);
        assert_eq!(doc.preferred_content(), "also raw");
    }

    #[test]
    fn test_value_to_text_joins_lists() {
        let v = json!(["line one", "line two"]);
        assert_eq!(value_to_text(&v), "line one\nline two");
    }

    #[tokio::test]
    async fn test_retrieval_tool_serializes_matches() {
        let retriever = Arc::new(StubRetriever {
            docs: vec![ScoredDocument::new(
                "Zoo opens at 9am",
                json!({"source": "kb"}),
                0.87,
            )],
        });
        let tool = RetrievalTool::new(retriever);

        let output = tool
            .execute(json!({"query": "San Diego Zoo hours"}))
            .await
            .unwrap();

        assert!(!output.is_error);
        let parsed: Vec<Value> = serde_json::from_str(&output.content).unwrap();
        assert_eq!(parsed[0]["content"], "Zoo opens at 9am");
        assert_eq!(parsed[0]["metadata"]["source"], "kb");
    }

    #[tokio::test]
    async fn test_retrieval_tool_rejects_bad_arguments() {
        let retriever = Arc::new(StubRetriever { docs: vec![] });
        let tool = RetrievalTool::new(retriever);

        let err = tool.execute(json!({"k": 3})).await.unwrap_err();
        assert!(err.to_string().contains("Invalid arguments"));
    }
}
