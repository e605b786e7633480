use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ftpflix_core::{
    load_config, validate_config, CatalogSource, CatalogStore, CommandLauncher,
    HttpCatalogSource, MediaLauncher, TracingLauncher,
};
use ftpflix_server::api::{create_router, WsBroadcaster};
use ftpflix_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ftpflix {}", VERSION);

    // Determine config path
    let config_path = std::env::var("FTPFLIX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");

    let http_source =
        HttpCatalogSource::new(&config.catalog).context("Failed to create catalog client")?;
    info!("Catalog index: {}", http_source.manifest_url());
    let source: Arc<dyn CatalogSource> = Arc::new(http_source);

    let launcher: Arc<dyn MediaLauncher> = match CommandLauncher::from_config(&config.player) {
        Some(launcher) => {
            info!("Using external player {:?}", launcher.program());
            Arc::new(launcher)
        }
        None => {
            info!("No player command configured, playback requests are only logged");
            Arc::new(TracingLauncher)
        }
    };

    let store = Arc::new(CatalogStore::from_config(source, launcher, &config));

    // WebSocket broadcaster mirrors store events to connected clients
    let ws_broadcaster = WsBroadcaster::default();
    let forwarder = ws_broadcaster.forward_store_events(store.subscribe());
    let heartbeat = ws_broadcaster.spawn_heartbeat(HEARTBEAT_INTERVAL);
    info!("WebSocket broadcaster initialized");

    if config.catalog.load_on_startup {
        let handle = store.spawn_load().context("Failed to start initial catalog load")?;
        tokio::spawn(async move {
            match handle.await {
                Ok(Ok(summary)) => info!(
                    "Initial catalog load finished: {} items, {} failed categories",
                    summary.total_items,
                    summary.failed_categories.len()
                ),
                Ok(Err(e)) => error!("Initial catalog load failed: {}", e),
                Err(e) => error!("Initial catalog load task panicked: {}", e),
            }
        });
    } else {
        info!("Catalog load on startup disabled; POST /api/v1/reload to load");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), store, ws_broadcaster));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    heartbeat.abort();
    forwarder.abort();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
