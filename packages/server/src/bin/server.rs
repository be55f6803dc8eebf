use clap::Parser;
use frontecs_server::{app, AppState, ServerConfig, SiteStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("frontecs_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.addr()?;

    let store = SiteStore::new(config.root_dir.clone());
    if !store.dist_dir().is_dir() {
        tracing::warn!(dist = %store.dist_dir().display(), "site build directory not found");
    }

    tracing::info!(root = %config.root_dir.display(), "Starting Frontecs server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP listening");
    axum::serve(listener, app(AppState::new(store))).await?;

    Ok(())
}
