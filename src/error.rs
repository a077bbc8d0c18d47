use crate::{management::StoreError, spotify::SpotifyError};

/// Outcome of the handshake, token lifecycle and playlist operations.
///
/// Authentication errors are never retried by the library; the HTTP layer maps
/// them to a 401 or an error redirect. Write errors carry enough detail for the
/// caller to decide whether to start over.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no Spotify credential on file for this session")]
    NotAuthenticated,

    #[error("authorization state mismatch")]
    CsrfMismatch,

    #[error("authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("token refresh failed: {detail}")]
    RefreshFailed { detail: String, revoked: bool },

    #[error("Spotify request failed: {0}")]
    Upstream(String),

    #[error(
        "playlist {playlist_id} was created but only {added} of {total} tracks were added: {detail}"
    )]
    PartialFailure {
        playlist_id: String,
        playlist_url: String,
        added: usize,
        total: usize,
        detail: String,
    },

    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotAuthenticated => "NOT_AUTHENTICATED",
            Error::CsrfMismatch => "CSRF_MISMATCH",
            Error::ExchangeFailed(_) => "EXCHANGE_FAILED",
            Error::RefreshFailed { .. } => "REFRESH_FAILED",
            Error::Upstream(_) => "UPSTREAM_ERROR",
            Error::PartialFailure { .. } => "PARTIAL_FAILURE",
            Error::Store(_) => "INTERNAL",
            Error::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// True when the user has to go through `/login` again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::NotAuthenticated
                | Error::CsrfMismatch
                | Error::ExchangeFailed(_)
                | Error::RefreshFailed { .. }
        )
    }
}

impl From<SpotifyError> for Error {
    fn from(err: SpotifyError) -> Self {
        Error::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
