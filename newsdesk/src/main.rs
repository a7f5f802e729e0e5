/*
newsdesk - single-binary main.rs
This binary builds the in-memory store, seeds it, and serves the JSON API and HTML UI with Rocket.
*/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsdesk::desk::NewsDesk;
use newsdesk::generator::{DraftGenerator, TemplateGenerator};
use newsdesk::server::launch_rocket;
use newsdesk::store::Store;

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Newsdesk news curation server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration
    #[arg(long)]
    bind: Option<String>,

    /// Override the port from the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");
    let override_path = match args.config {
        Some(p) if !p.exists() => {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p) => Some(p),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let mut config = Config::load_with_defaults(
        Some(default_path.as_path()).filter(|p| p.exists()),
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // The store lives for the whole process and is handed to the server via the desk
    let store = Arc::new(Store::new(config.store.cluster_policy));
    store
        .seed(&config.seed)
        .context("failed to seed the store")?;
    let (clusters, news) = store.counts();
    info!(clusters, news, policy = ?store.policy(), "store ready");

    let generator: Arc<dyn DraftGenerator> =
        Arc::new(TemplateGenerator::from_config(&config.generator));
    info!(delay_ms = config.generator.delay_ms, "draft generator ready");

    let desk = NewsDesk::new(store, generator);

    info!(bind = %config.server.bind, port = config.server.port, "Launching Rocket HTTP server");
    if let Err(e) = launch_rocket(desk, Arc::new(config)).await {
        error!(%e, "Rocket server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}
