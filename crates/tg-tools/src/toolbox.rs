//! Static dispatch for model-requested tool calls.
//!
//! The model names a function; resolution goes through the `ToolKind` enum
//! and a `match`, not a string-keyed table. The toolbox is a constructed
//! value handed to the gatherer, never module-level state.

use std::sync::Arc;

use tracing::{debug, warn};

use tg_core::{Tool, ToolCall, ToolDefinition};

use crate::retrieval::{RetrievalTool, Retriever};
use crate::search::{WebSearchTool, WebSearcher};

/// The closed set of tools the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Retrieval,
    WebSearch,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "search_rag" => Some(ToolKind::Retrieval),
            "duckduckgo_search" => Some(ToolKind::WebSearch),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Retrieval => "search_rag",
            ToolKind::WebSearch => "duckduckgo_search",
        }
    }
}

/// Both callable tools, constructed once per pipeline.
pub struct Toolbox {
    retrieval: RetrievalTool,
    web_search: WebSearchTool,
}

impl Toolbox {
    pub fn new(retriever: Arc<dyn Retriever>, searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            retrieval: RetrievalTool::new(retriever),
            web_search: WebSearchTool::new(searcher),
        }
    }

    /// Tool schemas advertised to the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![self.retrieval.definition(), self.web_search.definition()]
    }

    /// Execute one model-requested call. Failures come back as an
    /// `Error: …` string in the tool result so the loop degrades instead
    /// of aborting.
    pub async fn execute(&self, call: &ToolCall) -> String {
        let Some(kind) = ToolKind::from_name(&call.name) else {
            warn!(tool = %call.name, "Model requested unknown tool");
            return format!("Error: Unknown tool '{}'", call.name);
        };

        debug!(tool = kind.name(), arguments = %call.arguments, "Executing tool");

        let result = match kind {
            ToolKind::Retrieval => self.retrieval.execute(call.arguments.clone()).await,
            ToolKind::WebSearch => self.web_search.execute(call.arguments.clone()).await,
        };

        match result {
            Ok(output) => {
                if output.is_error {
                    format!("Error: {}", output.content)
                } else {
                    output.content
                }
            }
            Err(e) => {
                warn!(tool = kind.name(), error = %e, "Tool execution failed");
                format!("Error executing tool: {}", e)
            }
        }
    }
}
