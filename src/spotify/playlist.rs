use async_trait::async_trait;

use super::{PlaylistApi, SpotifyClient, SpotifyError, decode};
use crate::types::{
    AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
    CreatePlaylistResponse, UserProfile,
};

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, SpotifyError> {
        let res = self
            .http
            .get(format!("{uri}/me", uri = self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        decode(res).await
    }

    /// Creates a new playlist owned by `user_id`.
    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        let api_url = format!(
            "{uri}/users/{user}/playlists",
            uri = self.api_url,
            user = urlencoding::encode(user_id)
        );

        let res = self
            .http
            .post(&api_url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        decode(res).await
    }

    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, SpotifyError> {
        let api_url = format!(
            "{uri}/playlists/{playlist}/tracks",
            uri = self.api_url,
            playlist = urlencoding::encode(playlist_id)
        );

        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let res = self
            .http
            .post(&api_url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        decode(res).await
    }
}
