//! Web Research Gateway
//!
//! Axum server streaming answers from two research sessions as plain text:
//! a quick "simple" profile and a multi-step "deep" profile.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LlmProvider;
use agent_runtime::OllamaProvider;
use web_research::{Profile, SearchProvider, TavilyClient, build_session};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    // Reasoning engine
    let llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::from_config(config.ollama.clone())?);

    match llm.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = llm.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - searches will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    // Search provider
    let search: Arc<dyn SearchProvider> = Arc::new(TavilyClient::new(config.tavily.clone())?);
    tracing::info!("✓ Search provider: {}", search.name());

    // Sessions
    let options = config.profile_options();
    let simple = build_session(Profile::Simple, llm.clone(), search.clone(), &options)?;
    let deep = build_session(Profile::Deep, llm, search, &options)?;

    for session in [&simple, &deep] {
        tracing::info!(
            "Profile '{}' ({} tools, model {}):",
            session.config().name,
            session.tools().len(),
            session.config().generation.model
        );
        for name in session.tools().names() {
            tracing::info!("  • {}", name);
        }
    }

    let state = AppState::new(simple, deep, config.max_concurrent_streams, config.verbosity);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = handlers::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 web research gateway running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /, /health               - Health check");
    tracing::info!("  GET  /simple-search?prompt=   - Quick answer (streamed)");
    tracing::info!("  GET  /deep-search?prompt=     - Deep research (streamed)");
    tracing::info!(
        "Streams: at most {} concurrent, diagnostics {:?}",
        config.max_concurrent_streams,
        config.verbosity
    );
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
