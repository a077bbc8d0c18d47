//! # API Module
//!
//! HTTP handlers of the VibeCraft web server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /login`. Reuses or mints the session cookie, stores a
//!   fresh CSRF state and answers with a `302` to Spotify's consent page.
//! - [`callback`] - `GET /callback?code&state`. Validates the state, exchanges
//!   the code and redirects to the frontend with `spotify_auth=success` or
//!   `spotify_auth=error&error=<message>`.
//!
//! ### Playlists
//!
//! - [`create_playlist`] - `POST /create-playlist`. Creates a private
//!   playlist from `{ track_identifiers, playlist_name? }` and answers with
//!   its URL.
//!
//! ### Monitoring
//!
//! - [`health`] - status and version for load balancers.
//!
//! ## Error Responses
//!
//! JSON endpoints answer errors with `{ "error": { "code", "message", ... } }`.
//! Malformed bodies are `400`, authentication problems `401`, Spotify failures
//! `502` and storage failures `500`. A partially filled playlist additionally reports
//! `added`, `total` and `playlist_url` so the client can tell the user what
//! exists.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

mod callback;
mod health;
mod login;
mod playlist;

pub use callback::{CallbackParams, callback};
pub use health::health;
pub use login::login;
pub use playlist::{PlaylistCreatedResponse, create_playlist};

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl Error {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Error::NotAuthenticated
            | Error::CsrfMismatch
            | Error::ExchangeFailed(_)
            | Error::RefreshFailed { .. } => StatusCode::UNAUTHORIZED,
            Error::Upstream(_) | Error::PartialFailure { .. } => StatusCode::BAD_GATEWAY,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn to_error_body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            playlist_id: None,
            playlist_url: None,
            added: None,
            total: None,
        };

        match self {
            Error::PartialFailure {
                playlist_id,
                playlist_url,
                added,
                total,
                ..
            } => {
                body.playlist_id = Some(playlist_id.clone());
                body.playlist_url = Some(playlist_url.clone());
                body.added = Some(*added);
                body.total = Some(*total);
            }
            // internal details stay in the log
            Error::Store(_) => body.message = "internal error".to_string(),
            _ => {}
        }

        body
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: self.to_error_body(),
        };
        (status, Json(body)).into_response()
    }
}

/// Plain `302 Found` redirect.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
