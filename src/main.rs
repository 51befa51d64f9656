//! Pad Viewer server
//!
//! Reads config from `PAD_VIEWER_CONFIG` (default `config/pad_viewer.yaml`);
//! see `ViewerConfig` for the environment overrides.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pad_viewer::{
    config::ContentMode,
    server::{build_router, AppState},
    source::{
        BackendContentSource, ContentSource, EtherpadClient, HttpContentSource, LocalFileStore,
    },
    ViewerConfig,
};

/// Default configuration path
const DEFAULT_CONFIG_PATH: &str = "config/pad_viewer.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pad_viewer=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pad Viewer");

    let config_path =
        std::env::var("PAD_VIEWER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    tracing::info!(path = %config_path, "Loading configuration");
    let config = ViewerConfig::load(&config_path)?;

    let source: Arc<dyn ContentSource> = match config.content.mode {
        ContentMode::Backend => {
            tracing::info!(
                root = %config.content.root.display(),
                etherpad = %config.etherpad.base_url,
                "Reading content directly"
            );
            let files = LocalFileStore::new(config.content.root.clone());
            let etherpad = EtherpadClient::new(&config.etherpad)?;
            Arc::new(BackendContentSource::new(files, etherpad))
        }
        ContentMode::Http => {
            tracing::info!(api = %config.content.api_base_url, "Reading content through the content API");
            Arc::new(HttpContentSource::new(&config.content.api_base_url)?)
        }
    };

    let addr = config.server.addr.clone();
    let app = build_router(AppState::new(config, source)?);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("Pad Viewer listening on http://{}", addr);
    tracing::info!("  /output/<file|pad>/<location>?format=doc|ppt|ppt-print");
    tracing::info!("  /api/files/file?filePath=...");
    tracing::info!("  /api/etherpad/pad-revs?pad=...");
    tracing::info!("  /health");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
