//! Response Synthesizer: stage two of the pipeline.
//!
//! Re-grounds the gathered text with a fresh retrieval call, optionally
//! tops up sparse content from web search, and makes a single non-tool
//! model request for the final markdown answer.

use std::sync::Arc;

use tracing::{debug, warn};

use tg_core::{CompletionRequest, Message, Provider};
use tg_tools::{Retriever, WebSearcher};

use crate::prompts::SYNTHESIZER_SYSTEM_PROMPT;

/// User-visible answer when final generation fails.
pub const SYNTHESIS_APOLOGY: &str =
    "I apologize, but I encountered an error generating the final response.";

#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Top-k for the fresh grounding retrieval.
    pub top_k: usize,
    /// Below this combined content length (chars), web search kicks in.
    pub sparse_threshold: usize,
    /// Result count for the web-search fallback.
    pub web_results: usize,
    /// Model override; None uses the provider default.
    pub model: Option<String>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            sparse_threshold: 100,
            web_results: 3,
            model: None,
        }
    }
}

pub struct ResponseSynthesizer {
    provider: Arc<dyn Provider>,
    retriever: Arc<dyn Retriever>,
    searcher: Arc<dyn WebSearcher>,
    config: SynthesizerConfig,
}

impl ResponseSynthesizer {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        searcher: Arc<dyn WebSearcher>,
        config: SynthesizerConfig,
    ) -> Self {
        Self {
            provider,
            retriever,
            searcher,
            config,
        }
    }

    /// Produce the final grounded markdown answer. Never fails: external
    /// errors degrade to missing content or the apology string.
    pub async fn synthesize(&self, gathered: &str, query: &str) -> String {
        let mut content = gathered.trim().to_string();

        // Always re-query retrieval for the freshest grounding, even when
        // the gatherer already produced text.
        match self.retriever.search(query, self.config.top_k).await {
            Ok(matches) if !matches.is_empty() => {
                debug!(documents = matches.len(), "Fresh retrieval succeeded");
                let fragments: Vec<String> = matches
                    .iter()
                    .map(|doc| {
                        format!(
                            "Source (RAG, Score: {}):\n{}\n---",
                            doc.score,
                            doc.preferred_content()
                        )
                    })
                    .collect();
                content = join_content(&content, "--- ADDITIONAL RAG INFO ---", &fragments.join("\n"));
            }
            Ok(_) => debug!("Fresh retrieval returned no results"),
            Err(e) => warn!(error = %e, "Fresh retrieval failed"),
        }

        if content.trim().len() < self.config.sparse_threshold {
            debug!(
                length = content.trim().len(),
                threshold = self.config.sparse_threshold,
                "Content sparse, falling back to web search"
            );
            match self.searcher.search(query, self.config.web_results).await {
                Ok(hits) if !hits.is_empty() => {
                    let fragments: Vec<String> = hits
                        .iter()
                        .map(|hit| format!("Source (Web: {}):\n{}\n---", hit.title, hit.snippet))
                        .collect();
                    content =
                        join_content(&content, "--- ADDITIONAL WEB INFO ---", &fragments.join("\n"));
                }
                Ok(_) => debug!("Web search returned no results"),
                Err(e) => warn!(error = %e, "Web search failed"),
            }
        }

        let user_prompt = format!(
            "User Query: {query}\n\n\
             Gathered Information:\n{content}\n\n\
             Instructions:\n\
             Synthesize a comprehensive answer based ONLY on the Gathered Information above. \
             Prefer RAG information if available. \
             If the information mentions conflicting attractions, \
             ONLY use the information relevant to '{query}'."
        );

        let messages = vec![
            Message::system(SYNTHESIZER_SYSTEM_PROMPT),
            Message::user(user_prompt),
        ];

        // Single non-tool request; the synthesizer never calls tools itself.
        let mut request = CompletionRequest::new(messages);
        if let Some(model) = &self.config.model {
            request = request.with_model(model.as_str());
        }

        match self.provider.complete(request).await {
            Ok(response) => {
                let answer = response.message.content.trim().to_string();
                debug!(response_len = answer.len(), "Synthesis finished");
                answer
            }
            Err(e) => {
                warn!(error = %e, "Synthesis model call failed");
                SYNTHESIS_APOLOGY.to_string()
            }
        }
    }
}

fn join_content(existing: &str, divider: &str, addition: &str) -> String {
    if existing.is_empty() {
        addition.to_string()
    } else {
        format!("{}\n\n{}\n{}", existing, divider, addition)
    }
}
