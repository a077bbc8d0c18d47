use std::sync::Arc;

use super::auth::TokenManager;
use crate::{
    error::{Error, Result},
    session::SessionId,
    spotify::{MAX_ITEMS_PER_REQUEST, PlaylistApi},
    types::{CreatePlaylistRequest, PlaylistCreationResult},
    utils,
};

pub const DEFAULT_PLAYLIST_NAME: &str = "VibeCraft Playlist";
pub const PLAYLIST_DESCRIPTION: &str = "Created with MusikkMeta";

/// Creates a playlist for the session's user and fills it in order.
pub struct PlaylistManager {
    tokens: Arc<TokenManager>,
    api: Arc<dyn PlaylistApi>,
    chunk_size: usize,
}

impl PlaylistManager {
    pub fn new(tokens: Arc<TokenManager>, api: Arc<dyn PlaylistApi>) -> Self {
        PlaylistManager {
            tokens,
            api,
            chunk_size: MAX_ITEMS_PER_REQUEST,
        }
    }

    /// Overrides the number of items sent per add call, capped at the API limit.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_ITEMS_PER_REQUEST);
        self
    }

    /// Creates a private playlist and appends `track_identifiers` to it.
    ///
    /// Items are sent in chunks, one call after the other, so the playlist ends
    /// up in the order given. The first failing chunk stops the run and the
    /// error reports how many tracks made it in. Nothing is retried: a second
    /// create call could leave the user with two playlists.
    pub async fn create_playlist_with_tracks(
        &self,
        session: &SessionId,
        playlist_name: Option<&str>,
        track_identifiers: &[String],
    ) -> Result<PlaylistCreationResult> {
        let token = self.tokens.get_live_token(session).await?;

        let user = self.api.current_user(&token).await?;

        let name = playlist_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PLAYLIST_NAME);

        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: false,
            collaborative: false,
        };

        let playlist = self.api.create_playlist(&token, &user.id, &request).await?;
        let playlist_url = playlist.url();

        tracing::info!(
            session = %session,
            playlist_id = %playlist.id,
            tracks = track_identifiers.len(),
            "playlist created"
        );

        let uris: Vec<String> = track_identifiers
            .iter()
            .map(|id| utils::to_track_uri(id))
            .collect();

        let mut added = 0;
        for chunk in uris.chunks(self.chunk_size) {
            if let Err(e) = self.api.add_tracks(&token, &playlist.id, chunk).await {
                tracing::error!(
                    session = %session,
                    playlist_id = %playlist.id,
                    added,
                    total = uris.len(),
                    error = %e,
                    "adding tracks failed"
                );
                return Err(Error::PartialFailure {
                    playlist_id: playlist.id,
                    playlist_url,
                    added,
                    total: uris.len(),
                    detail: e.to_string(),
                });
            }
            added += chunk.len();
        }

        Ok(PlaylistCreationResult {
            playlist_id: playlist.id,
            playlist_url,
            tracks_added: added,
        })
    }
}
