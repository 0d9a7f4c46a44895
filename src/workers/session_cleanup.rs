use crate::services::sessions;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

/// Background worker that periodically deletes expired sessions
///
/// Keeps `user_sessions` from accumulating rows the middleware would reject
/// anyway. Stops when the shutdown channel fires.
pub async fn session_cleanup_worker(
    pool: sqlx::PgPool,
    every_seconds: u64,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    let mut cleanup_interval = interval(Duration::from_secs(every_seconds.max(1)));
    info!(every_seconds, "Session cleanup worker started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Session cleanup worker shutting down");
                break;
            }
            _ = cleanup_interval.tick() => {
                let mut conn = match pool.acquire().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to acquire database connection for cleanup: {}", e);
                        continue;
                    }
                };

                match sessions::cleanup_expired_sessions(&mut conn).await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleaned up {} expired sessions", count);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to clean up expired sessions: {}", e);
                    }
                }
            }
        }
    }

    info!("Session cleanup worker stopped");
}
