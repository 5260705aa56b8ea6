//! tg-agents: the two-stage travel-guide pipeline.
//!
//! Stage one ([`InformationGatherer`]) collects material for a query via a
//! tool-calling model loop seeded from retrieval. Stage two
//! ([`ResponseSynthesizer`]) re-grounds that material and produces the final
//! markdown answer. [`AssistantPipeline`] chains them.

pub mod extract;
pub mod gatherer;
pub mod prompts;
pub mod synthesizer;

pub use gatherer::{GathererConfig, InformationGatherer, GATHER_FALLBACK};
pub use synthesizer::{ResponseSynthesizer, SynthesizerConfig, SYNTHESIS_APOLOGY};

use std::sync::Arc;

use tracing::info;

use tg_core::Provider;
use tg_tools::{Retriever, Toolbox, WebSearcher};

/// The full query-to-answer pipeline.
pub struct AssistantPipeline {
    gatherer: InformationGatherer,
    synthesizer: ResponseSynthesizer,
}

impl AssistantPipeline {
    pub fn new(gatherer: InformationGatherer, synthesizer: ResponseSynthesizer) -> Self {
        Self {
            gatherer,
            synthesizer,
        }
    }

    /// Wire both stages from shared collaborators with the given configs.
    pub fn build(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        searcher: Arc<dyn WebSearcher>,
        gatherer_config: GathererConfig,
        synthesizer_config: SynthesizerConfig,
    ) -> Self {
        let toolbox = Toolbox::new(retriever.clone(), searcher.clone());
        let gatherer = InformationGatherer::new(
            provider.clone(),
            retriever.clone(),
            toolbox,
            gatherer_config,
        );
        let synthesizer =
            ResponseSynthesizer::new(provider, retriever, searcher, synthesizer_config);
        Self::new(gatherer, synthesizer)
    }

    /// Answer `query`: gather, then synthesize. Never fails; degraded paths
    /// surface as fallback text from the stage that hit them.
    pub async fn answer(&self, query: &str) -> String {
        info!(query, "Gathering information");
        let gathered = self.gatherer.gather(query).await;

        info!(gathered_len = gathered.len(), "Synthesizing final response");
        self.synthesizer.synthesize(&gathered, query).await
    }

    /// Like [`answer`](Self::answer), but also returns the intermediate
    /// gathered text for display or debugging.
    pub async fn answer_with_gathered(&self, query: &str) -> (String, String) {
        info!(query, "Gathering information");
        let gathered = self.gatherer.gather(query).await;

        info!(gathered_len = gathered.len(), "Synthesizing final response");
        let answer = self.synthesizer.synthesize(&gathered, query).await;
        (gathered, answer)
    }
}
