//! Free-text function server binary

use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_prompt::defaults::load_registry;
use agent_suql::{LlmTextGenerator, TiktokenCounter};
use agent_utils::{AppConfig, init_tracing};
use clap::Parser;
use free_text_server::{AppState, EmbeddingRanker, FreeTextEngine, ServerConfig, build_router};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "free-text-server")]
#[command(about = "Answer and summary functions over free-text columns", long_about = None)]
struct Args {
    /// TOML configuration file; environment variables otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configured address
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let app = match &args.config {
        Some(path) => AppConfig::from_toml_file(path)?,
        None => AppConfig::from_env()?,
    };

    let mut config = ServerConfig::from_app_config(&app);
    if let Some(port) = args.port {
        config.port = port;
    }

    let provider = Arc::new(OpenAIProvider::with_config(OpenAIConfig::from_app_config(&app))?);
    let prompts = load_registry(app.prompt_dir.as_deref())?;
    let generator = LlmTextGenerator::new(provider.clone(), Arc::new(prompts), app.capability_timeout);
    let ranker = EmbeddingRanker::new(provider, app.embedding_model.clone());

    let engine = FreeTextEngine::new(
        Arc::new(generator),
        Arc::new(ranker),
        Arc::new(TiktokenCounter::cl100k()?),
        config.clone(),
    );
    let router = build_router(AppState {
        engine: Arc::new(engine),
    });

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Free-text function server listening on http://{}", address);
    info!("  POST /answer  POST /summary  GET /health");

    axum::serve(listener, router).await?;
    Ok(())
}
