use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use crate::{config::DatabaseConfig, error::Result};

/// Database connection pool type
pub type DbPool = sqlx::PgPool;

/// Database connection type - supports both pool connections and transactions
/// Use `conn.as_mut()` for pool connections, `tx.as_mut()` for transactions
pub type DbConn = sqlx::PgConnection;

/// Connects the single application pool and brings the schema up to date.
///
/// Called once at startup. Any failure here is fatal: the server must not
/// start against a database it cannot reach or has not migrated.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.connection_string().expose_secret())
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(
        host = %config.host,
        database = %config.database,
        "Database connected and migrations applied"
    );

    Ok(pool)
}
