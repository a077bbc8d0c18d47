//! VibeCraft Spotify Playlist Service Library
//!
//! This library signs a browser user in to Spotify through the OAuth 2.0
//! authorization code flow, keeps the resulting tokens alive per session and
//! uses them to create private playlists filled with an ordered list of tracks.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for login, callback, playlist creation and health
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by the handshake, token and playlist flows
//! - `management` - Session state storage, OAuth handshake, token lifecycle and
//!   playlist orchestration
//! - `server` - Router construction and the HTTP listener
//! - `session` - Session cookie identity
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use vibecraft::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> vibecraft::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     let state = server::AppState::from_config(&config).await?;
//!     server::serve(config.server_addr, state).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the edges of the application (startup, configuration, the
/// listener) where any error simply ends the process. The session and
/// playlist flows use [`error::Result`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Loading configuration...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal startup errors; request handling never calls it.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("No .env file found, using process environment only");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
