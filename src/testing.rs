//! Stub providers shared by the unit tests.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    spotify::{OAuthProvider, PlaylistApi, SpotifyError},
    types::{
        AddTrackToPlaylistResponse, CreatePlaylistRequest, CreatePlaylistResponse, Credential,
        ExternalUrls, TokenResponse, UserProfile,
    },
};

pub fn credential_expiring_in(secs: i64) -> Credential {
    Credential {
        access_token: "cached-access".to_string(),
        refresh_token: "cached-refresh".to_string(),
        expires_at: Utc::now() + chrono::Duration::seconds(secs),
        scope: "playlist-modify-private".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Succeed,
    SucceedRotating,
    Fail,
    Revoke,
}

#[derive(Debug)]
pub struct StubProvider {
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub fail_exchange: bool,
    pub exchange_delay: Duration,
    pub refresh_outcome: RefreshOutcome,
    pub refresh_delay: Duration,
    /// `expires_in` of every issued token.
    pub expires_in: i64,
}

impl Default for StubProvider {
    fn default() -> Self {
        StubProvider {
            exchange_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            fail_exchange: false,
            exchange_delay: Duration::ZERO,
            refresh_outcome: RefreshOutcome::Succeed,
            refresh_delay: Duration::ZERO,
            expires_in: 3600,
        }
    }
}

impl StubProvider {
    pub fn exchanges(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example.com/authorize?client_id=test&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if !self.exchange_delay.is_zero() {
            tokio::time::sleep(self.exchange_delay).await;
        }
        if self.fail_exchange {
            return Err(SpotifyError::OAuth {
                code: "invalid_grant".to_string(),
                description: Some("Invalid authorization code".to_string()),
            });
        }
        Ok(TokenResponse {
            access_token: format!("access-for-{code}"),
            token_type: Some("Bearer".to_string()),
            scope: Some("playlist-modify-private".to_string()),
            expires_in: self.expires_in,
            refresh_token: Some(format!("refresh-for-{code}")),
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        match self.refresh_outcome {
            RefreshOutcome::Fail => Err(SpotifyError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            }),
            RefreshOutcome::Revoke => Err(SpotifyError::OAuth {
                code: "invalid_grant".to_string(),
                description: Some("Refresh token revoked".to_string()),
            }),
            outcome => Ok(TokenResponse {
                access_token: format!("refreshed-{n}"),
                token_type: Some("Bearer".to_string()),
                scope: None,
                expires_in: self.expires_in,
                refresh_token: (outcome == RefreshOutcome::SucceedRotating)
                    .then(|| format!("{refresh_token}-rotated")),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct StubPlaylistApi {
    pub user_calls: AtomicUsize,
    pub created: Mutex<Vec<CreatePlaylistRequest>>,
    pub add_calls: Mutex<Vec<Vec<String>>>,
    pub tokens_seen: Mutex<Vec<String>>,
    pub fail_user: bool,
    pub fail_create: bool,
    /// 1-based index of the add call that fails.
    pub fail_add_on: Option<usize>,
}

impl StubPlaylistApi {
    pub fn total_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
            + self.created.lock().unwrap().len()
            + self.add_calls.lock().unwrap().len()
    }

    pub fn add_call_sizes(&self) -> Vec<usize> {
        self.add_calls.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl PlaylistApi for StubPlaylistApi {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, SpotifyError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen
            .lock()
            .unwrap()
            .push(access_token.to_string());
        if self.fail_user {
            return Err(SpotifyError::Status {
                status: 401,
                body: "The access token expired".to_string(),
            });
        }
        Ok(UserProfile {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
        })
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        _user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        self.created.lock().unwrap().push(request.clone());
        if self.fail_create {
            return Err(SpotifyError::Status {
                status: 403,
                body: "Insufficient client scope".to_string(),
            });
        }
        Ok(CreatePlaylistResponse {
            id: "pl123".to_string(),
            name: request.name.clone(),
            external_urls: ExternalUrls {
                spotify: Some("https://open.spotify.com/playlist/pl123".to_string()),
            },
        })
    }

    async fn add_tracks(
        &self,
        _access_token: &str,
        _playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, SpotifyError> {
        let call = {
            let mut calls = self.add_calls.lock().unwrap();
            calls.push(uris.to_vec());
            calls.len()
        };
        if self.fail_add_on == Some(call) {
            return Err(SpotifyError::Status {
                status: 502,
                body: "Bad gateway".to_string(),
            });
        }
        Ok(AddTrackToPlaylistResponse {
            snapshot_id: format!("snapshot-{call}"),
        })
    }
}
