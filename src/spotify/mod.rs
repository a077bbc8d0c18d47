//! # Spotify Integration Module
//!
//! This module is the integration layer between VibeCraft and Spotify's two
//! services: the accounts service (authorization and token endpoints) and the
//! Web API (user profile and playlist endpoints).
//!
//! ## Architecture
//!
//! ```text
//! Management Layer (handshake, token lifecycle, playlist orchestration)
//!          ↓
//! OAuthProvider / PlaylistApi traits
//!          ↓
//! SpotifyClient (reqwest, JSON)
//!          ↓
//! Spotify Accounts Service + Web API
//! ```
//!
//! The management layer only sees the two traits, so tests and alternative
//! deployments inject their own implementations.
//!
//! ## Core Modules
//!
//! - [`auth`] - authorization URL, authorization code exchange and refresh
//!   grant, authenticated with the client secret (HTTP Basic).
//! - [`playlist`] - current user profile, playlist creation and batched item
//!   insertion.
//!
//! ## API Coverage
//!
//! - `GET /authorize` - user consent page (redirect only)
//! - `POST /api/token` - code exchange and refresh operations
//! - `GET /me` - current user profile
//! - `POST /users/{user_id}/playlists` - create new playlists
//! - `POST /playlists/{playlist_id}/tracks` - add up to 100 items per call
//!
//! ## Error Handling
//!
//! Every response is decoded into a typed record. Non-success statuses and
//! bodies that don't match the expected schema become a [`SpotifyError`] right
//! at this boundary. No call made here is retried: creating a playlist is not
//! idempotent and the caller decides whether to start over.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    types::{
        AddTrackToPlaylistResponse, CreatePlaylistRequest, CreatePlaylistResponse, OAuthErrorBody,
        TokenResponse, UserProfile,
    },
};

pub mod auth;
pub mod playlist;

/// Maximum number of items the add-items endpoint accepts per call.
pub const MAX_ITEMS_PER_REQUEST: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Spotify returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authorization server rejected the request: {code}: {}", .description.as_deref().unwrap_or("no description"))]
    OAuth {
        code: String,
        description: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl SpotifyError {
    /// The refresh token was revoked or has expired; the user must log in again.
    pub fn is_revoked(&self) -> bool {
        matches!(self, SpotifyError::OAuth { code, .. } if code == "invalid_grant")
    }
}

/// Accounts service operations used by the handshake and the token lifecycle.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Consent page URL carrying the given CSRF state.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError>;

    /// Trade a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError>;
}

/// Web API operations used by the playlist orchestrator.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, SpotifyError>;

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError>;

    /// Appends `uris` to the end of the playlist, in order.
    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, SpotifyError>;
}

/// reqwest-backed implementation of [`OAuthProvider`] and [`PlaylistApi`].
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: reqwest::Url,
    token_url: String,
    api_url: String,
}

impl SpotifyClient {
    /// Builds the client with the configured request timeout.
    ///
    /// Token refreshes run while the session's lock is held, so an unbounded
    /// request would stall every later request of that session.
    pub fn new(config: &Config) -> Result<Self, SpotifyError> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &Config) -> Self {
        SpotifyClient {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            api_url: config.api_url.clone(),
        }
    }
}

/// Decodes a Web API response, turning error statuses into [`SpotifyError::Status`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SpotifyError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SpotifyError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| SpotifyError::Decode(e.to_string()))
}

/// Decodes a token endpoint response, surfacing OAuth error codes.
async fn decode_token(response: Response) -> Result<TokenResponse, SpotifyError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<OAuthErrorBody>(&body) {
            Ok(err) => SpotifyError::OAuth {
                code: err.error,
                description: err.error_description,
            },
            Err(_) => SpotifyError::Status {
                status: status.as_u16(),
                body,
            },
        });
    }

    serde_json::from_str(&body).map_err(|e| SpotifyError::Decode(e.to_string()))
}
