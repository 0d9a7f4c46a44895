use crate::config::SessionConfig;

/// Session cookie security configuration
///
/// Controls how the session cookie is created and secured for browser clients
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct CookieConfig {
    /// Name of the session cookie (default: "session_id")
    pub name: String,
    /// HttpOnly flag prevents JavaScript access (XSS protection)
    pub http_only: bool,
    /// Secure flag ensures HTTPS-only transmission (should be true in production)
    pub secure: bool,
    /// SameSite attribute for CSRF protection
    pub same_site: SameSite,
    /// Path attribute to limit cookie scope
    pub path: String,
    /// Lifetime in seconds, matching the server-side session expiry
    pub max_age_seconds: i64,
}

/// SameSite cookie attribute for CSRF protection
#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Strict mode - cookie not sent with cross-site requests
    Strict,
    /// Lax mode - cookie sent with top-level navigations
    Lax,
    /// None mode - cookie sent with all requests (requires Secure)
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session_id".to_string(),
            http_only: true,
            secure: false, // Set to true in production
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_seconds: 24 * 3600,
        }
    }
}

impl From<&SessionConfig> for CookieConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.secure_cookie,
            max_age_seconds: config.ttl_hours * 3600,
            ..Self::default()
        }
    }
}

/// Builds a Set-Cookie header value for the session token
///
/// # Example
/// ```rust
/// use vetportal::services::cookies::{build_session_cookie, CookieConfig};
///
/// let cookie = build_session_cookie("my_token", &CookieConfig::default());
/// assert_eq!(cookie, "session_id=my_token; HttpOnly; SameSite=Lax; Path=/; Max-Age=86400");
/// ```
pub fn build_session_cookie(token: &str, config: &CookieConfig) -> String {
    format!(
        "{}={}{}{}; SameSite={}; Path={}; Max-Age={}",
        config.name,
        token,
        if config.http_only { "; HttpOnly" } else { "" },
        if config.secure { "; Secure" } else { "" },
        config.same_site.as_str(),
        config.path,
        config.max_age_seconds
    )
}

/// Builds a Set-Cookie header value that clears the session cookie
///
/// Used during logout to invalidate the cookie by setting Max-Age=0
pub fn build_clear_session_cookie(config: &CookieConfig) -> String {
    format!(
        "{}=; HttpOnly; SameSite={}; Path={}; Max-Age=0",
        config.name,
        config.same_site.as_str(),
        config.path
    )
}

/// Extract specific cookie value from Cookie header
///
/// # Returns
/// * `Some(value)` - Cookie value if found (may be empty)
/// * `None` - Cookie not found
pub fn extract_cookie_value(cookie_str: &str, cookie_name: &str) -> Option<String> {
    cookie_str
        .split(';')
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (name, value) = cookie.split_once('=')?;
            (name == cookie_name).then(|| value.to_string())
        })
}
