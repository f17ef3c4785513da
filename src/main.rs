//! event-hub server entry point.
//!
//! Loads configuration, optionally restores state from PostgreSQL, and
//! serves the REST API until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use event_hub::api;
use event_hub::app_state::AppState;
use event_hub::config::{HubConfig, LogFormat};
use event_hub::domain::{EventStore, UserDirectory};
use event_hub::persistence::PostgresDocuments;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = HubConfig::from_env()?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting event-hub");

    // Build domain layer
    let events = Arc::new(EventStore::new());
    let users = Arc::new(UserDirectory::new());

    let documents = if config.persistence_enabled {
        let documents = PostgresDocuments::connect(&config).await?;
        let user_count = users.load(documents.load_users().await?).await;
        let event_count = events.load(documents.load_events().await?).await;
        tracing::info!(users = user_count, events = event_count, "restored documents");
        Some(documents)
    } else {
        tracing::info!("persistence disabled, state is in memory only");
        None
    };

    // Build service layer and router
    let app_state = AppState::new(events, users, documents);
    let app = api::build_app(
        app_state,
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
