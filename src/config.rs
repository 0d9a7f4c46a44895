use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sessions: SessionConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single request, enforced by the timeout layer
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub user: String,
    #[serde(skip_serializing, default = "default_database_password")]
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// HMAC key used to sign session tokens
    #[serde(skip_serializing, default = "default_session_secret")]
    pub secret: SecretString,
    pub cookie_name: String,
    pub ttl_hours: i64,
    /// Adds the `Secure` attribute to the session cookie (enable behind HTTPS)
    pub secure_cookie: bool,
    pub cleanup_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    pub code_ttl_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            // Override with environment variables using `VETPORTAL` prefix and `__` separator
            // e.g., VETPORTAL__DATABASE__USER="my_user"
            .add_source(
                config::Environment::with_prefix("VETPORTAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl SessionConfig {
    /// Rejects the built-in placeholder and secrets too short to sign with.
    pub fn ensure_usable_secret(&self) -> Result<(), config::ConfigError> {
        let secret = self.secret.expose_secret();
        if secret == PLACEHOLDER_SESSION_SECRET {
            return Err(config::ConfigError::Message(
                "sessions.secret is the built-in placeholder; set VETPORTAL__SESSIONS__SECRET".to_string(),
            ));
        }
        if secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(config::ConfigError::Message(format!(
                "sessions.secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Constructs the database connection string.
    pub fn connection_string(&self) -> SecretString {
        SecretString::from(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database
        ))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
        }
    }
}

// Secrets are never serialized, so the layered source needs explicit fallbacks
fn default_database_password() -> SecretString {
    "password".to_string().into()
}

const PLACEHOLDER_SESSION_SECRET: &str = "change-me-session-secret-at-least-32-bytes";
const MIN_SESSION_SECRET_BYTES: usize = 32;

fn default_session_secret() -> SecretString {
    PLACEHOLDER_SESSION_SECRET.to_string().into()
}

// Default values for the database configuration
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: default_database_password(),
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_session_secret(),
            cookie_name: "session_id".to_string(),
            ttl_hours: 24,
            secure_cookie: false,
            cleanup_interval_seconds: 600,
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { code_ttl_minutes: 30 }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets are skipped by serde, so the JSON is safe to log
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}
