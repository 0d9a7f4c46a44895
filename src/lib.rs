pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
pub mod workers;

pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};
pub use routes::build_router;
pub use services::email::{LogMailer, Mailer};
pub use state::AppState;

use std::sync::Arc;

use tokio::{net::TcpListener, sync::broadcast};

/// Load configuration from environment variables
pub fn load_config() -> Result<Config> {
    Ok(Config::load()?)
}

/// Connects to the database, starts background workers and serves the API
/// until Ctrl-C or SIGTERM.
pub async fn run_server(config: Config) -> Result<()> {
    config.sessions.ensure_usable_secret()?;
    let pool = database::connect(&config.database).await?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let cleanup_handle = tokio::spawn(workers::session_cleanup_worker(
        pool.clone(),
        config.sessions.cleanup_interval_seconds,
        shutdown_tx.subscribe(),
    ));

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(pool, config, Arc::new(LogMailer));
    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind {}: {}", address, e)))?;
    tracing::info!("Veterinary portal API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

    let _ = shutdown_tx.send(());
    if let Err(e) = cleanup_handle.await {
        tracing::warn!("Session cleanup worker did not stop cleanly: {}", e);
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
