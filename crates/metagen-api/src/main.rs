//! Axum API server binary.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use metagen_api::{create_router, metrics, ApiConfig, AppState, ServerHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("metagen=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting metagen-api");

    let config = ApiConfig::from_env();
    info!(
        "API config: host={}, port={}, keys={}, model={}",
        config.host,
        config.port,
        config.api_keys.len(),
        config.gemini.model
    );

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let state = AppState::new(config.clone())?;
    let app = create_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let server = ServerHandle::spawn(listener, app)?;

    shutdown_signal().await?;
    server.shutdown().await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");
    Ok(())
}
