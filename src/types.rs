use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Error body returned by the accounts service on a rejected token request.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Access/refresh token pair of one authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub scope: String,
}

/// A token endpoint response that cannot become a usable credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenResponseError {
    #[error("token response did not include a refresh token")]
    MissingRefreshToken,

    #[error("token response has an unusable expires_in of {0} seconds")]
    InvalidExpiry(i64),
}

/// Absolute expiry of a token issued at `now`, rejecting non-positive and
/// out-of-range lifetimes.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, TokenResponseError> {
    if expires_in <= 0 {
        return Err(TokenResponseError::InvalidExpiry(expires_in));
    }
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or(TokenResponseError::InvalidExpiry(expires_in))
}

impl Credential {
    /// Builds a credential from a code exchange response.
    ///
    /// The authorization code grant must hand out a refresh token, otherwise the
    /// session could not outlive the first access token.
    pub fn from_exchange(
        response: TokenResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, TokenResponseError> {
        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(TokenResponseError::MissingRefreshToken)?;
        Ok(Credential {
            access_token: response.access_token,
            refresh_token,
            expires_at: expiry_after(now, response.expires_in)?,
            scope: response.scope.unwrap_or_default(),
        })
    }

    /// Applies a refresh grant response in place.
    ///
    /// The refresh token is only replaced when the provider rotated it. A
    /// rejected response leaves the credential untouched.
    pub fn apply_refresh(
        &mut self,
        response: TokenResponse,
        now: DateTime<Utc>,
    ) -> Result<(), TokenResponseError> {
        self.expires_at = expiry_after(now, response.expires_in)?;
        self.access_token = response.access_token;
        if let Some(rotated) = response.refresh_token.filter(|t| !t.is_empty()) {
            self.refresh_token = rotated;
        }
        if let Some(scope) = response.scope {
            self.scope = scope;
        }
        Ok(())
    }

    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at
            .checked_sub_signed(margin)
            .is_none_or(|refresh_at| refresh_at <= now)
    }
}

/// Everything the store keeps for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

impl SessionEntry {
    pub fn is_empty(&self) -> bool {
        self.csrf_state.is_none() && self.credential.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl CreatePlaylistResponse {
    /// Public link to the playlist, falling back to the canonical web URL.
    pub fn url(&self) -> String {
        self.external_urls
            .spotify
            .clone()
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", self.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

/// Inbound body of `POST /create-playlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistCreationRequest {
    #[serde(alias = "track_uris")]
    pub track_identifiers: Vec<String>,
    #[serde(default)]
    pub playlist_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCreationResult {
    pub playlist_id: String,
    pub playlist_url: String,
    pub tracks_added: usize,
}
