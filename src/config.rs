//! Configuration management for the VibeCraft playlist service.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Configuration is read once at process start into an
//! immutable [`Config`] which is then shared by the handshake driver, the Spotify
//! client and the HTTP layer.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;

pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_FRONTEND_URL: &str = "/";
pub const DEFAULT_COOKIE_MAX_AGE_SECS: i64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Backend used for session state and cached credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    Memory,
    File,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: Url,
    pub token_url: String,
    pub api_url: String,
    /// Upper bound for one request to Spotify, connect to last body byte.
    pub http_timeout: Duration,
    pub server_addr: SocketAddr,
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub cookie_max_age_secs: i64,
    pub store: StoreKind,
    pub store_dir: PathBuf,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated like unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let auth_url_raw =
            get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let auth_url = Url::parse(&auth_url_raw).map_err(|_| ConfigError::Invalid {
            key: "SPOTIFY_API_AUTH_URL",
            value: auth_url_raw.clone(),
        })?;

        let addr_raw =
            get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
        let server_addr = SocketAddr::from_str(&addr_raw).map_err(|_| ConfigError::Invalid {
            key: "SERVER_ADDRESS",
            value: addr_raw.clone(),
        })?;

        let cookie_secure = match get("SESSION_COOKIE_SECURE") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "SESSION_COOKIE_SECURE",
                value: v,
            })?,
            None => false,
        };

        let cookie_max_age_secs = match get("SESSION_COOKIE_MAX_AGE") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: "SESSION_COOKIE_MAX_AGE",
                    value: v,
                })?,
            None => DEFAULT_COOKIE_MAX_AGE_SECS,
        };

        let http_timeout_secs = match get("SPOTIFY_API_TIMEOUT") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: "SPOTIFY_API_TIMEOUT",
                    value: v,
                })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let store = match get("SESSION_STORE") {
            Some(v) => v.parse().map_err(|value| ConfigError::Invalid {
                key: "SESSION_STORE",
                value,
            })?,
            None => StoreKind::Memory,
        };

        let store_dir = get("SESSION_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_store_dir);

        Ok(Config {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            auth_url,
            token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            api_url: get("SPOTIFY_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            server_addr,
            frontend_url: get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            cookie_secure,
            cookie_max_age_secs,
            store,
            store_dir,
        })
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `vibecraft` data directory if it doesn't exist. A missing `.env`
/// file is fine, the process environment alone may carry the configuration.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/vibecraft/.env`
/// - macOS: `~/Library/Application Support/vibecraft/.env`
/// - Windows: `%LOCALAPPDATA%/vibecraft/.env`
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = data_dir();
    path.push(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Platform data directory for this application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("vibecraft");
    path
}

fn default_store_dir() -> PathBuf {
    let mut path = data_dir();
    path.push("sessions");
    path
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
