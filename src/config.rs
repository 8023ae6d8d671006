//! Job configuration loaded from environment variables.
//!
//! Loaded once at startup. A `.env` file in the working directory is honored
//! for local runs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default Webex API root.
pub const DEFAULT_API_BASE: &str = "https://webexapis.com/v1";

/// How the job authenticates against the Webex API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Service-app credentials; access tokens are redeemed from the refresh token.
    OAuth {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    /// Long-lived bot token used as-is.
    BotToken(String),
}

/// Job configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    /// Webex API root (no trailing slash)
    pub api_base: String,
    /// Device tags to mirror; each becomes a phonebook folder
    pub favorite_tags: Vec<String>,
    /// Time between cycle starts
    pub refresh_period: Duration,
    /// Grace delay before the first cycle
    pub startup_delay: Duration,
    /// Per-request timeout for the HTTP client
    pub http_timeout: Duration,
    /// File backing the persisted credential slot
    pub credential_path: PathBuf,
    /// File backing the local phonebook
    pub phonebook_path: PathBuf,
    /// Port for the status server, if enabled
    pub status_port: Option<u16>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            auth: AuthConfig::OAuth {
                client_id: "test_client_id".to_string(),
                client_secret: "test_secret".to_string(),
                refresh_token: "test_refresh_token".to_string(),
            },
            api_base: "http://127.0.0.1:0".to_string(),
            favorite_tags: vec!["phonebook-contact".to_string(), "testing".to_string()],
            refresh_period: Duration::from_secs(3600),
            startup_delay: Duration::from_millis(1000),
            http_timeout: Duration::from_secs(30),
            credential_path: PathBuf::from("favorites-credential.txt"),
            phonebook_path: PathBuf::from("phonebook.json"),
            status_port: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let auth = match (
            non_empty_var("WEBEX_CLIENT_ID"),
            non_empty_var("WEBEX_CLIENT_SECRET"),
            non_empty_var("WEBEX_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => AuthConfig::OAuth {
                client_id,
                client_secret,
                refresh_token,
            },
            (None, None, None) => AuthConfig::BotToken(
                non_empty_var("WEBEX_BOT_TOKEN").ok_or(ConfigError::Missing("WEBEX_BOT_TOKEN"))?,
            ),
            (None, _, _) => return Err(ConfigError::Missing("WEBEX_CLIENT_ID")),
            (_, None, _) => return Err(ConfigError::Missing("WEBEX_CLIENT_SECRET")),
            (_, _, None) => return Err(ConfigError::Missing("WEBEX_REFRESH_TOKEN")),
        };

        let favorite_tags = parse_tags(
            &env::var("FAVORITE_TAGS").map_err(|_| ConfigError::Missing("FAVORITE_TAGS"))?,
        );

        let refresh_secs: u64 = parse_var("REFRESH_PERIOD_SECS", 3600)?;
        if refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REFRESH_PERIOD_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            auth,
            api_base: env::var("WEBEX_API_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            favorite_tags,
            refresh_period: Duration::from_secs(refresh_secs),
            startup_delay: Duration::from_millis(parse_var("STARTUP_DELAY_MS", 1000)?),
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 30)?),
            credential_path: env::var("CREDENTIAL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("favorites-credential.txt")),
            phonebook_path: env::var("PHONEBOOK_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("phonebook.json")),
            status_port: env::var("STATUS_PORT")
                .ok()
                .map(|v| {
                    v.trim().parse().map_err(|_| ConfigError::Invalid {
                        name: "STATUS_PORT",
                        reason: format!("not a port number: {}", v),
                    })
                })
                .transpose()?,
        })
    }
}

/// Split a comma-separated tag list, keeping order and dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("not an unsigned integer: {}", v),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
