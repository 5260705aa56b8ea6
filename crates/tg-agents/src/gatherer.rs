//! Information Gatherer: stage one of the pipeline.
//!
//! Seeds the conversation with an existing-knowledge preamble pulled from
//! retrieval, then lets the model call `search_rag` / `duckduckgo_search`
//! until it answers in plain text.

use std::sync::Arc;

use tracing::{debug, warn};

use tg_core::{CompletionRequest, Message, Provider};
use tg_tools::{Retriever, Toolbox};

use crate::extract::{additional_info_from_metadata, additional_info_section, strip_tool_markup};
use crate::prompts::{GATHERER_SYSTEM_PROMPT, TOOL_RESULTS_REMINDER};

/// Returned when nothing could be gathered: every degraded path ends here
/// instead of an error.
pub const GATHER_FALLBACK: &str = "Unable to gather additional information.";

#[derive(Debug, Clone)]
pub struct GathererConfig {
    /// Top-k for the seeding retrieval call.
    pub top_k: usize,
    /// Bound on tool-calling rounds before giving up.
    pub max_iterations: usize,
    /// Model override; None uses the provider default.
    pub model: Option<String>,
}

impl Default for GathererConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_iterations: 8,
            model: None,
        }
    }
}

pub struct InformationGatherer {
    provider: Arc<dyn Provider>,
    retriever: Arc<dyn Retriever>,
    toolbox: Toolbox,
    config: GathererConfig,
}

impl InformationGatherer {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        toolbox: Toolbox,
        config: GathererConfig,
    ) -> Self {
        Self {
            provider,
            retriever,
            toolbox,
            config,
        }
    }

    /// Gather information about `query`. Never fails: external errors
    /// degrade to the fixed fallback string.
    pub async fn gather(&self, query: &str) -> String {
        let preamble = self.existing_knowledge(query).await;

        let mut messages = vec![
            Message::system(GATHERER_SYSTEM_PROMPT),
            Message::user(format!(
                "{}Gather comprehensive information about: {}",
                preamble, query
            )),
        ];

        for iteration in 0..self.config.max_iterations {
            let mut request =
                CompletionRequest::new(messages.clone()).with_tools(self.toolbox.definitions());
            if let Some(model) = &self.config.model {
                request = request.with_model(model.as_str());
            }

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Gatherer model call failed");
                    return GATHER_FALLBACK.to_string();
                }
            };

            let tool_calls = response.message.tool_calls.clone();
            if !tool_calls.is_empty() {
                debug!(
                    iteration,
                    tool_count = tool_calls.len(),
                    "Gatherer executing tool calls"
                );

                // Tool calls are stored with empty content; whatever partial
                // text came with them is not part of the answer.
                messages.push(Message::assistant_with_tool_calls("", tool_calls.clone()));

                for call in &tool_calls {
                    let result = self.toolbox.execute(call).await;
                    messages.push(Message::tool_result(&call.id, result));
                }

                messages.push(Message::user(TOOL_RESULTS_REMINDER));
                continue;
            }

            let content = response.message.content.trim().to_string();
            if content.is_empty() {
                return GATHER_FALLBACK.to_string();
            }

            debug!(
                iterations = iteration + 1,
                response_len = content.len(),
                "Gatherer finished"
            );
            return strip_tool_markup(&content);
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Gatherer exhausted tool-calling rounds"
        );
        GATHER_FALLBACK.to_string()
    }

    /// Build the EXISTING KNOWLEDGE preamble from retrieval matches.
    ///
    /// Only the "additional information" part of each document is used:
    /// structured metadata first, regex section scan second. Documents
    /// without either contribute nothing here; the tool loop can still
    /// fetch them in full via `search_rag`.
    async fn existing_knowledge(&self, query: &str) -> String {
        let matches = match self.retriever.search(query, self.config.top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Seeding retrieval failed");
                return String::new();
            }
        };

        if matches.is_empty() {
            debug!("Seeding retrieval returned no results");
            return String::new();
        }

        let mut fragments = Vec::new();
        for doc in &matches {
            if let Some((key, info)) = additional_info_from_metadata(&doc.metadata) {
                fragments.push(format!(
                    "Source (RAG metadata '{}', Score: {}):\n{}\n---",
                    key, doc.score, info
                ));
            } else if let Some(section) = additional_info_section(&doc.page_content) {
                fragments.push(format!(
                    "Source (RAG 'Additional Information' section, Score: {}):\n{}\n---",
                    doc.score, section
                ));
            }
        }

        if fragments.is_empty() {
            debug!(
                documents = matches.len(),
                "No additional-information sections in retrieval matches"
            );
            return String::new();
        }

        format!(
            "EXISTING KNOWLEDGE (RAG - Additional Information Only):\n{}\n\n",
            fragments.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use tg_core::testing::MockProvider;
    use tg_core::Error;
    use tg_tools::{ScoredDocument, SearchHit, WebSearcher};

    struct StubRetriever {
        docs: Vec<ScoredDocument>,
        fail: bool,
    }

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<ScoredDocument>, Error> {
            if self.fail {
                Err(Error::tool("search_rag", "backend down"))
            } else {
                Ok(self.docs.clone())
            }
        }
    }

    struct EmptySearcher;

    #[async_trait]
    impl WebSearcher for EmptySearcher {
        async fn search(&self, _query: &str, _max: usize) -> Result<Vec<SearchHit>, Error> {
            Ok(vec![])
        }
    }

    fn gatherer(provider: Arc<MockProvider>, docs: Vec<ScoredDocument>, fail: bool) -> InformationGatherer {
        let retriever = Arc::new(StubRetriever { docs, fail });
        let toolbox = Toolbox::new(retriever.clone(), Arc::new(EmptySearcher));
        InformationGatherer::new(provider, retriever, toolbox, GathererConfig::default())
    }

    #[tokio::test]
    async fn test_gather_returns_model_content() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_response("## San Diego Zoo\n\nOpen daily.");

        let result = gatherer(provider.clone(), vec![], false)
            .gather("San Diego Zoo")
            .await;

        assert_eq!(result, "## San Diego Zoo\n\nOpen daily.");
        // Both tools were advertised to the model
        let request = provider.last_request().unwrap();
        let tool_names: Vec<_> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tool_names, vec!["search_rag", "duckduckgo_search"]);
    }

    #[tokio::test]
    async fn test_gather_never_fails_when_everything_errors() {
        // Retrieval fails and the provider has nothing queued: the mock
        // returns an error, which must degrade to the fallback string.
        let provider = Arc::new(MockProvider::new());
        let result = gatherer(provider, vec![], true).gather("anything").await;
        assert_eq!(result, GATHER_FALLBACK);
    }

    #[tokio::test]
    async fn test_gather_fallback_on_empty_content() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_response("");

        let result = gatherer(provider, vec![], false).gather("query").await;
        assert_eq!(result, GATHER_FALLBACK);
    }

    #[tokio::test]
    async fn test_gather_preamble_prefers_metadata_over_section() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_response("answer");

        let docs = vec![
            ScoredDocument::new(
                "### Additional information: from the regex path",
                json!({"json": {"Additional information": "from metadata"}}),
                0.9,
            ),
            ScoredDocument::new("### Additional information: section only", json!({}), 0.8),
            ScoredDocument::new("no section at all", json!({}), 0.7),
        ];

        gatherer(provider.clone(), docs, false).gather("zoo").await;

        let request = provider.last_request().unwrap();
        let user_message = &request.messages[1].content;
        assert!(user_message.contains("EXISTING KNOWLEDGE"));
        assert!(user_message.contains("from metadata"));
        assert!(!user_message.contains("from the regex path"));
        assert!(user_message.contains("section only"));
        // The document without a section contributes nothing
        assert!(!user_message.contains("no section at all"));
    }

    #[tokio::test]
    async fn test_gather_tool_loop_executes_and_reminds() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_tool_call("call-1", "search_rag", json!({"query": "zoo tickets", "k": 2}));
        provider.queue_response("Final text with <search_rag>leftover</search_rag> markup");

        let docs = vec![ScoredDocument::new("Tickets cost $30", json!({}), 0.9)];
        let result = gatherer(provider.clone(), docs, false).gather("zoo").await;

        // Residual markup is stripped from the final answer
        assert_eq!(result, "Final text with  markup");
        assert_eq!(provider.request_count(), 2);

        // Second request carries: assistant tool-call msg, tool result, reminder
        let request = provider.last_request().unwrap();
        let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
        use tg_core::Role;
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::User]
        );
        assert!(request.messages[3].content.contains("Tickets cost $30"));
        assert!(request.messages[4].content.contains("markdown"));
    }

    #[tokio::test]
    async fn test_gather_fallback_when_iterations_exhausted() {
        let provider = Arc::new(MockProvider::new());
        for i in 0..GathererConfig::default().max_iterations {
            provider.queue_tool_call(
                &format!("call-{}", i),
                "search_rag",
                json!({"query": "zoo"}),
            );
        }

        let result = gatherer(provider, vec![], false).gather("zoo").await;
        assert_eq!(result, GATHER_FALLBACK);
    }
}
