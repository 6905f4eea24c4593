use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tandem_catalog::Catalog;
use tandem_engine::{Recommender, RecommenderConfig, ScoreWeights};
use tandem_protocol::{HistorySnapshot, SuggestionRequest};
use tandem_theme_index::{
    ExtractorConfig, HttpEmbeddingClient, ThemeExtractor, ThemeVectorIndex,
};

#[derive(Parser)]
#[command(name = "tandem-suggest")]
#[command(about = "Rank activity suggestions for a couple's current context", long_about = None)]
#[command(version)]
struct Cli {
    /// Catalog JSON file (defaults to the built-in catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Request JSON file; reads stdin when omitted
    #[arg(long)]
    request: Option<PathBuf>,

    /// History snapshot JSON file (recency hours + preference ratios)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Embedding service endpoint; keyword matching only when omitted
    #[arg(long)]
    embed_url: Option<String>,

    /// Ranked suggestions to return
    #[arg(long, default_value_t = 3)]
    top: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::builtin().context("failed to load built-in catalog")?,
    };
    let catalog = Arc::new(catalog);
    tandem_catalog::install(catalog.clone()).context("failed to install catalog registry")?;
    log::debug!(
        "Catalog ready: {} activities, {} themes",
        catalog.len(),
        catalog.themes().len()
    );

    let extractor_config = ExtractorConfig::default();
    let extractor = match &cli.embed_url {
        Some(endpoint) => {
            let timeout = Duration::from_millis(extractor_config.timeout_ms);
            let client = Arc::new(HttpEmbeddingClient::new(endpoint.clone(), timeout)?);
            let index = ThemeVectorIndex::build(client.as_ref(), catalog.themes()).await?;
            ThemeExtractor::with_semantic(
                catalog.themes().to_vec(),
                client,
                index,
                extractor_config,
            )
        }
        None => ThemeExtractor::keyword_only(catalog.themes().to_vec(), extractor_config),
    };

    let config = RecommenderConfig {
        top_n: cli.top,
        ..RecommenderConfig::default()
    };
    let engine = Recommender::with_config(catalog, extractor, ScoreWeights::default(), config)?;

    let request: SuggestionRequest = match &cli.request {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request {}", path.display()))?;
            serde_json::from_str(&raw).context("invalid request JSON")?
        }
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read request from stdin")?;
            serde_json::from_str(&raw).context("invalid request JSON")?
        }
    };

    let history: HistorySnapshot = match &cli.history {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read history {}", path.display()))?;
            serde_json::from_str(&raw).context("invalid history JSON")?
        }
        None => HistorySnapshot::default(),
    };

    let response = engine.suggest(&request, &history).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
