use anyhow::Context;
use tracing_subscriber::EnvFilter;

use devcamper_api::config::AppConfig;
use devcamper_api::server;
use devcamper_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("devcamper_api=debug,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting DevCamper API in {:?} mode", config.environment);

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.upload.dir.display()))?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::connect(config).await?;
    let app = server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("DevCamper API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
