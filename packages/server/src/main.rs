// Main entry point for the pressroom API server

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pressroom_server::server::app::{build_app, build_state};
use pressroom_server::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pressroom_server=debug,origin=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let port = config.port;

    let state = build_state(&config);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!(port = port, "pressroom server listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
