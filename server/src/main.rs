//! SimplyPut Server binary.

use simplyput_server::{app, config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simplyput_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting SimplyPut Server on {}:{}", config.host, config.port);

    match &config.data_path {
        Some(path) => tracing::info!("Persisting store to {}", path.display()),
        None => tracing::warn!("DATA_PATH not set; records are kept in memory only"),
    }
    if config.requires_auth() {
        tracing::info!("Namespacing requests across {} tokens", config.tokens.len());
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
