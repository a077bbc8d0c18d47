use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{error::Error, server::AppState, session, types::PlaylistCreationRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistCreatedResponse {
    pub message: String,
    pub playlist_id: String,
    pub playlist_url: String,
    pub tracks_added: usize,
}

/// Creates a private playlist for the logged in user.
///
/// Requests without a session cookie are rejected like sessions without a
/// credential; this route never mints a session.
pub async fn create_playlist(
    State(app): State<AppState>,
    jar: CookieJar,
    body: Result<Json<PlaylistCreationRequest>, JsonRejection>,
) -> Result<Json<PlaylistCreatedResponse>, Error> {
    let session = session::existing(&jar).ok_or(Error::NotAuthenticated)?;
    let Json(body) = body.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;

    tracing::info!(
        session = %session,
        tracks = body.track_identifiers.len(),
        "playlist creation started"
    );

    let result = app
        .playlists
        .create_playlist_with_tracks(
            &session,
            body.playlist_name.as_deref(),
            &body.track_identifiers,
        )
        .await?;

    Ok(Json(PlaylistCreatedResponse {
        message: "Playlist created successfully!".to_string(),
        playlist_id: result.playlist_id,
        playlist_url: result.playlist_url,
        tracks_added: result.tracks_added,
    }))
}
