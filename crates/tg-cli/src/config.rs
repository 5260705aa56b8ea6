use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, loaded from ~/.config/tg/config.toml. A missing file
/// yields the defaults, which point at a local Ollama server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible chat completions base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional API key; local servers usually need none.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub model: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Search route of the retrieval service.
    #[serde(default = "default_retrieval_endpoint")]
    pub endpoint: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: default_retrieval_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    /// Override for the DuckDuckGo HTML endpoint, mostly for testing.
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Top-k for the gatherer's seeding retrieval.
    #[serde(default = "default_gather_top_k")]
    pub gather_top_k: usize,

    /// Bound on gatherer tool-calling rounds.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Top-k for the synthesizer's grounding retrieval.
    #[serde(default = "default_synthesis_top_k")]
    pub synthesis_top_k: usize,

    /// Character threshold below which the synthesizer adds web results.
    #[serde(default = "default_sparse_threshold")]
    pub sparse_threshold: usize,

    /// Web result count for the synthesizer's fallback search.
    #[serde(default = "default_web_results")]
    pub web_results: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gather_top_k: default_gather_top_k(),
            max_iterations: default_max_iterations(),
            synthesis_top_k: default_synthesis_top_k(),
            sparse_threshold: default_sparse_threshold(),
            web_results: default_web_results(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_retrieval_endpoint() -> String {
    "http://localhost:8001/search".to_string()
}

fn default_gather_top_k() -> usize {
    3
}

fn default_max_iterations() -> usize {
    8
}

fn default_synthesis_top_k() -> usize {
    5
}

fn default_sparse_threshold() -> usize {
    100
}

fn default_web_results() -> usize {
    3
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("tg").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [provider]
            base_url = "http://gpu-box:11434/v1"
            model = "qwen3:8b"

            [retrieval]
            endpoint = "http://localhost:9000/search"

            [pipeline]
            max_iterations = 4
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.provider.base_url, "http://gpu-box:11434/v1");
        assert_eq!(config.provider.model, Some("qwen3:8b".to_string()));
        assert_eq!(config.retrieval.endpoint, "http://localhost:9000/search");
        assert_eq!(config.pipeline.max_iterations, 4);
        // Unset sections fall back to defaults
        assert_eq!(config.pipeline.gather_top_k, 3);
        assert_eq!(config.pipeline.sparse_threshold, 100);
        assert!(config.search.endpoint.is_none());
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.provider.base_url, "http://localhost:11434/v1");
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.pipeline.synthesis_top_k, 5);
        assert_eq!(config.pipeline.web_results, 3);
    }
}
