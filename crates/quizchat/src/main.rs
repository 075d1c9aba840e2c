use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quizchat::config::{Config, StoreBackend};
use quizchat::llm::{Dispatcher, PersonaRegistry};
use quizchat::server::{AppState, build_app};
use quizchat::store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};

#[derive(Parser)]
#[command(name = "quizchat", version, about = "Quiz backend with persona LLM chat")]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, default_value = "quizchat.yaml")]
    config: PathBuf,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let registry = if config.personas.is_empty() {
        PersonaRegistry::default()
    } else {
        PersonaRegistry::from_entries(std::mem::take(&mut config.personas))
            .context("invalid persona roster")?
    };
    let personas: Vec<&str> = registry.nicknames().collect();
    info!(?personas, "Loaded persona roster");

    let dispatcher = Dispatcher::from_env(registry, &config.providers)
        .context("building provider HTTP client")?;

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::File => {
            info!(path = %config.store.path.display(), "Using file document store");
            Arc::new(
                FileDocumentStore::open(&config.store.path)
                    .await
                    .context("opening document store")?,
            )
        }
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        store,
    };
    let app = build_app(state, config.server.request_timeout_seconds);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "quizchat listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
