//! Refbridge Server
//!
//! Serves the annotation and query bridge over HTTP on a local port.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refbridge_server::config::Config;
use refbridge_server::routes;
use refbridge_server::state::AppState;
use refbridge_server::store::{CitekeyIndex, SqliteCitekeyIndex, SqliteItemStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "refbridge_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Refbridge Server v{}", env!("CARGO_PKG_VERSION"));

    // Initialize item store
    let store = SqliteItemStore::connect(&config.database.url)
        .await
        .context("Failed to initialize item store")?
        .with_max_results(config.database.max_results);
    tracing::info!("Item store opened at {}", config.database.url);

    let citekeys: Option<Arc<dyn CitekeyIndex>> = if config.bridge.citekey_index {
        Some(Arc::new(SqliteCitekeyIndex::new(store.pool().clone())))
    } else {
        tracing::info!("Citekey index disabled, resolving from extra fields only");
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, Arc::new(store), citekeys);

    let app = routes::router(app_state).layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Refbridge Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
