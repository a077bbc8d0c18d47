use std::sync::Arc;

use chrono::{Duration, Utc};

use super::{locks::KeyedLocks, state::SessionStore};
use crate::{
    error::{Error, Result},
    session::SessionId,
    spotify::OAuthProvider,
};

/// Tokens are refreshed this long before they actually expire.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// Hands out live access tokens, refreshing them when they are about to expire.
///
/// The check-then-refresh sequence runs under a per-session lock: two
/// requests of one session never spend the same refresh token twice, and
/// requests of different sessions never wait on each other.
pub struct TokenManager {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn OAuthProvider>,
    locks: KeyedLocks,
    margin: Duration,
}

impl TokenManager {
    pub fn new(store: Arc<dyn SessionStore>, provider: Arc<dyn OAuthProvider>) -> Self {
        TokenManager {
            store,
            provider,
            locks: KeyedLocks::new(),
            margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }

    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    pub async fn get_live_token(&self, session: &SessionId) -> Result<String> {
        let _guard = self.locks.lock(session.as_str()).await;

        let Some(mut credential) = self.store.get_credential(session).await? else {
            return Err(Error::NotAuthenticated);
        };

        let now = Utc::now();
        if !credential.expires_within(self.margin, now) {
            return Ok(credential.access_token);
        }

        tracing::debug!(session = %session, "access token expired, refreshing");

        match self.provider.refresh_token(&credential.refresh_token).await {
            Ok(response) => {
                if let Err(e) = credential.apply_refresh(response, Utc::now()) {
                    tracing::warn!(session = %session, error = %e, "refresh response rejected");
                    return Err(Error::RefreshFailed {
                        detail: e.to_string(),
                        revoked: false,
                    });
                }
                self.store.put_credential(session, &credential).await?;
                Ok(credential.access_token)
            }
            Err(e) if e.is_revoked() => {
                tracing::warn!(session = %session, error = %e, "refresh token revoked, credential cleared");
                self.store.delete_credential(session).await?;
                Err(Error::RefreshFailed {
                    detail: e.to_string(),
                    revoked: true,
                })
            }
            Err(e) => {
                tracing::warn!(session = %session, error = %e, "token refresh failed");
                Err(Error::RefreshFailed {
                    detail: e.to_string(),
                    revoked: false,
                })
            }
        }
    }
}
