use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tg_agents::{AssistantPipeline, GathererConfig, SynthesizerConfig};
use tg_core::Provider;
use tg_providers::OpenAiProvider;
use tg_tools::{DuckDuckGoClient, HttpRetriever, Retriever, WebSearcher};

mod config;

use config::Config;

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: all tracing
    Trace,
    /// Verbose: model requests, tool execution details
    Debug,
    /// Standard: high-level pipeline flow
    Info,
    /// Quiet: only warnings and errors
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "tg")]
#[command(author, version, about = "Travel-guide assistant: grounded answers about attractions and destinations", long_about = None)]
pub struct Cli {
    /// The travel question to answer
    pub query: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL for the OpenAI-compatible API (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Retrieval service search endpoint (overrides config)
    #[arg(long)]
    pub retrieval_url: Option<String>,

    /// Print the intermediate gathered information before the answer
    #[arg(long)]
    pub show_gathered: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::new(cli.log_level.as_filter());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;

    match &cli.command {
        Some(Commands::Config) => show_config(&config),
        None => match &cli.query {
            Some(query) => answer_mode(&cli, &config, query).await,
            None => {
                anyhow::bail!("No query given. Usage: tg \"<your travel question>\"");
            }
        },
    }
}

async fn answer_mode(cli: &Cli, config: &Config, query: &str) -> Result<()> {
    let provider: Arc<dyn Provider> = Arc::new(build_provider(cli, config));

    let retrieval_endpoint = cli
        .retrieval_url
        .clone()
        .unwrap_or_else(|| config.retrieval.endpoint.clone());
    let retriever: Arc<dyn Retriever> = Arc::new(HttpRetriever::new(retrieval_endpoint));

    let searcher: Arc<dyn WebSearcher> = match &config.search.endpoint {
        Some(endpoint) => Arc::new(DuckDuckGoClient::new().with_endpoint(endpoint)),
        None => Arc::new(DuckDuckGoClient::new()),
    };

    let model = cli.model.clone().or_else(|| config.provider.model.clone());
    let gatherer_config = GathererConfig {
        top_k: config.pipeline.gather_top_k,
        max_iterations: config.pipeline.max_iterations,
        model: model.clone(),
    };
    let synthesizer_config = SynthesizerConfig {
        top_k: config.pipeline.synthesis_top_k,
        sparse_threshold: config.pipeline.sparse_threshold,
        web_results: config.pipeline.web_results,
        model,
    };

    let pipeline = AssistantPipeline::build(
        provider,
        retriever,
        searcher,
        gatherer_config,
        synthesizer_config,
    );

    if cli.show_gathered {
        let (gathered, answer) = pipeline.answer_with_gathered(query).await;
        println!("--- Gathered Information ---\n{}\n", gathered);
        println!("--- Answer ---\n{}", answer);
    } else {
        let answer = pipeline.answer(query).await;
        println!("{}", answer);
    }

    Ok(())
}

fn build_provider(cli: &Cli, config: &Config) -> OpenAiProvider {
    let mut provider = OpenAiProvider::new();

    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| config.provider.base_url.clone());
    provider = provider.with_base_url(base_url);

    if let Some(api_key) = &config.provider.api_key {
        provider = provider.with_api_key(api_key);
    }
    if let Some(model) = cli.model.as_ref().or(config.provider.model.as_ref()) {
        provider = provider.with_default_model(model);
    }

    provider
}

fn show_config(config: &Config) -> Result<()> {
    println!("Configuration ({}):", Config::config_path()?.display());
    println!("  Provider:");
    println!("    Base URL: {}", config.provider.base_url);
    println!(
        "    Model: {}",
        config.provider.model.as_deref().unwrap_or("(server default)")
    );
    if config.provider.api_key.is_some() {
        println!("    API key: (configured)");
    }
    println!("  Retrieval:");
    println!("    Endpoint: {}", config.retrieval.endpoint);
    if let Some(endpoint) = &config.search.endpoint {
        println!("  Search:");
        println!("    Endpoint: {}", endpoint);
    }
    println!("  Pipeline:");
    println!("    Gather top-k: {}", config.pipeline.gather_top_k);
    println!("    Max tool iterations: {}", config.pipeline.max_iterations);
    println!("    Synthesis top-k: {}", config.pipeline.synthesis_top_k);
    println!("    Sparse threshold: {}", config.pipeline.sparse_threshold);
    println!("    Web results: {}", config.pipeline.web_results);
    Ok(())
}
