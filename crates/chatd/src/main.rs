//! chatd - tiered chat answering daemon
//!
//! Answers each message from the FAQ file, then the LLM, then a canned fallback.

use anyhow::{Context, Result};
use chat_common::{FallbackService, FaqStore, HttpLlmClient, VaguenessClassifier, VERSION};
use chatd::config::Config;
use chatd::server::{self, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chatd", version, about = "Tiered FAQ / LLM / fallback chat service")]
struct Args {
    /// Config file (defaults: $CHATD_CONFIG, /etc/chatd/config.toml, /var/lib/chatd/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides [server].bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("[BOOT] chatd v{} starting", VERSION);

    let mut config = match &args.config {
        Some(path) => Config::load_explicit(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let faq = Arc::new(FaqStore::open(&config.faq.path));
    info!("[BOOT] FAQ store ready ({} entries)", faq.len());

    if !config.llm.is_usable() {
        warn!("[BOOT] LLM tier disabled: set OPENAI_API_KEY or [llm].api_key");
    }
    let llm = Arc::new(
        HttpLlmClient::new(config.llm.clone()).context("Failed to create LLM client")?,
    );
    info!("[BOOT] LLM model {} at {}", config.llm.model, config.llm.endpoint);

    let fallback = Arc::new(FallbackService::open(&config.fallback));
    let classifier = VaguenessClassifier::new(&config.vagueness);

    let state = AppState::new(faq, llm, fallback, classifier);
    server::run(state, &config.server).await?;

    info!("chatd stopped");
    Ok(())
}
