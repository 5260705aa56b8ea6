//! tg-tools: the two external collaborators of the pipeline, exposed both as
//! plain async clients and as model-callable tools.
//!
//! - `retrieval`: the local RAG index (`search_rag`)
//! - `search`: DuckDuckGo web search (`duckduckgo_search`)
//! - `toolbox`: statically dispatched tool execution for the agent loop

pub mod retrieval;
pub mod search;
pub mod toolbox;

pub use retrieval::{Document, HttpRetriever, RetrievalTool, Retriever, ScoredDocument};
pub use search::{DuckDuckGoClient, SearchHit, WebSearchTool, WebSearcher};
pub use toolbox::{ToolKind, Toolbox};
