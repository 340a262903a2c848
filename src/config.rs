//! Application configuration loaded from environment variables.
//!
//! Credentials are read once at startup and held in memory for the lifetime
//! of the process.

use crate::models::Credentials;
use chrono_tz::Tz;
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Default identity service base URL (the Cognito proxy lives under it).
pub const DEFAULT_AUTH_URL: &str = "https://api.prod.whoop.com";
/// Default data API base URL.
pub const DEFAULT_API_URL: &str = "https://api.prod.whoop.com/developer";

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Base URL of the identity service
    pub auth_url: String,
    /// Base URL of the WHOOP data API
    pub api_url: String,
    /// Timezone used to resolve "today" and local day boundaries
    pub timezone: Tz,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// WHOOP account credentials
    pub credentials: Credentials,
    /// Bearer token required on the tool routes, if set
    pub mcp_auth_token: Option<SecretString>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let account_id = env::var("WHOOP_EMAIL")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("WHOOP_EMAIL"))?;
        let secret = env::var("WHOOP_PASSWORD").map_err(|_| ConfigError::Missing("WHOOP_PASSWORD"))?;

        let timezone = match env::var("WHOOP_TIMEZONE") {
            Ok(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::Invalid("WHOOP_TIMEZONE", name))?,
            Err(_) => Tz::UTC,
        };

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            auth_url: env::var("WHOOP_AUTH_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            api_url: env::var("WHOOP_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timezone,
            http_timeout,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            credentials: Credentials::new(account_id, secret),
            mcp_auth_token: env::var("MCP_AUTH_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            auth_url: "http://127.0.0.1:9".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            timezone: Tz::UTC,
            http_timeout: Duration::from_secs(5),
            port: DEFAULT_PORT,
            credentials: Credentials::new("athlete@example.com", "test_password"),
            mcp_auth_token: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
