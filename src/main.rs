//! Device Hub Dashboard - Rust Implementation
//!
//! Serves the live telemetry dashboard for a device hub cloud connector.

use devicehub_dashboard::{bus, config, connector, dom, host, lifecycle, locale};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devicehub_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Device Hub Dashboard v{} ({})",
        env!("DHD_VERSION"),
        env!("DHD_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!(
        "Configuration loaded, port: {}, api: {}",
        config.port,
        config.api_url
    );

    // Data source
    let mut cloud = connector::CloudConnector::new(&config.api_url)?;
    if let Some(username) = config.username.clone() {
        cloud = cloud.with_basic_auth(username, config.password.clone());
        tracing::info!("Using basic auth for {}", cloud.api_url());
    }

    // Create event bus
    let bus = bus::create_bus();
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(selector = event.selector(), "{:?}", event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event log lagged, {} events skipped", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let ctx = lifecycle::PageContext {
        document: dom::Document::new(),
        source: Arc::new(cloud),
        locale: Arc::new(locale::Locale::for_language(&config.locale)),
        bus,
    };
    let dashboard = Arc::new(host::Dashboard::assemble(ctx, &config).await);

    // First render runs alongside the server; polling screens arm their
    // refresh loops once their content is in.
    let renderer = dashboard.clone();
    tokio::spawn(async move { renderer.render_all().await });

    let app = host::router(host::AppState::new(dashboard.clone()));

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopping refresh loops...");
    dashboard.stop_polling().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
