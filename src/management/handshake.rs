use std::sync::Arc;

use chrono::Utc;

use super::state::SessionStore;
use crate::{
    error::{Error, Result},
    session::SessionId,
    spotify::OAuthProvider,
    types::Credential,
    utils,
};

/// Drives the three-legged authorization code flow for one session at a time.
///
/// Per session: `NoAttempt -> PendingState -> Authenticated`. A state
/// mismatch, a failed exchange or a cancelled consent drops the pending state
/// again and the user has to start over at `/login`.
pub struct OAuthHandshake {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn OAuthProvider>,
}

impl OAuthHandshake {
    pub fn new(store: Arc<dyn SessionStore>, provider: Arc<dyn OAuthProvider>) -> Self {
        OAuthHandshake { store, provider }
    }

    /// Starts a login attempt and returns the consent page URL.
    ///
    /// Only the most recent attempt of a session is valid; its state replaces
    /// whatever was pending before.
    pub async fn begin_login(&self, session: &SessionId) -> Result<String> {
        let csrf_state = utils::generate_token(utils::TOKEN_LENGTH);
        self.store.put_state(session, &csrf_state).await?;

        tracing::debug!(session = %session, "login attempt started");
        Ok(self.provider.authorize_url(&csrf_state))
    }

    /// Completes a login attempt.
    ///
    /// The returned state must equal the stored one exactly; otherwise the
    /// code is never sent to the token endpoint.
    pub async fn handle_callback(
        &self,
        session: &SessionId,
        code: &str,
        returned_state: &str,
    ) -> Result<()> {
        // pending state is consumed whatever happens next
        let stored = self.store.take_state(session).await?;

        if stored.as_deref() != Some(returned_state) {
            tracing::warn!(session = %session, pending = stored.is_some(), "OAuth state mismatch");
            return Err(Error::CsrfMismatch);
        }

        let response = self.provider.exchange_code(code).await.map_err(|e| {
            tracing::error!(session = %session, error = %e, "token exchange failed");
            Error::ExchangeFailed(e.to_string())
        })?;

        let credential = Credential::from_exchange(response, Utc::now()).map_err(|e| {
            tracing::error!(session = %session, error = %e, "token response rejected");
            Error::ExchangeFailed(e.to_string())
        })?;

        self.store.put_credential(session, &credential).await?;

        tracing::info!(session = %session, scope = %credential.scope, "Spotify login successful");
        Ok(())
    }

    /// Drops the pending attempt after the provider reported an error.
    pub async fn cancel_login(&self, session: &SessionId) -> Result<()> {
        self.store.clear_state(session).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        management::MemoryStore,
        testing::{StubProvider, credential_expiring_in},
    };

    fn handshake(provider: StubProvider) -> (OAuthHandshake, Arc<MemoryStore>, Arc<StubProvider>) {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(provider);
        let handshake = OAuthHandshake::new(store.clone(), provider.clone());
        (handshake, store, provider)
    }

    fn state_from(url: &str) -> String {
        url.split("state=").nth(1).unwrap().to_string()
    }

    #[tokio::test]
    async fn test_begin_login_stores_state_in_url() {
        let (handshake, store, _) = handshake(StubProvider::default());
        let session = SessionId::generate();

        let url = handshake.begin_login(&session).await.unwrap();
        let stored = store.get_state(&session).await.unwrap().unwrap();

        assert_eq!(state_from(&url), stored);
        assert_eq!(stored.len(), utils::TOKEN_LENGTH);
    }

    #[tokio::test]
    async fn test_successful_callback_stores_credential() {
        let (handshake, store, provider) = handshake(StubProvider::default());
        let session = SessionId::generate();

        let url = handshake.begin_login(&session).await.unwrap();
        handshake
            .handle_callback(&session, "the-code", &state_from(&url))
            .await
            .unwrap();

        let credential = store.get_credential(&session).await.unwrap().unwrap();
        assert_eq!(credential.access_token, "access-for-the-code");
        assert_eq!(credential.refresh_token, "refresh-for-the-code");
        assert!(credential.expires_at > Utc::now());
        assert!(store.get_state(&session).await.unwrap().is_none());
        assert_eq!(provider.exchanges(), 1);
    }

    #[tokio::test]
    async fn test_state_mismatch_never_exchanges() {
        let (handshake, store, provider) = handshake(StubProvider::default());
        let session = SessionId::generate();

        handshake.begin_login(&session).await.unwrap();
        let err = handshake
            .handle_callback(&session, "the-code", "forged-state")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CsrfMismatch));
        assert_eq!(provider.exchanges(), 0);
        assert!(store.get_credential(&session).await.unwrap().is_none());
        // back to NoAttempt
        assert!(store.get_state(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_callback_without_pending_state() {
        let (handshake, _, provider) = handshake(StubProvider::default());
        let session = SessionId::generate();

        let err = handshake
            .handle_callback(&session, "the-code", "any-state")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CsrfMismatch));
        assert_eq!(provider.exchanges(), 0);
    }

    #[tokio::test]
    async fn test_state_of_other_session_is_rejected() {
        let (handshake, _, provider) = handshake(StubProvider::default());
        let alice = SessionId::generate();
        let mallory = SessionId::generate();

        let url = handshake.begin_login(&alice).await.unwrap();
        let err = handshake
            .handle_callback(&mallory, "the-code", &state_from(&url))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CsrfMismatch));
        assert_eq!(provider.exchanges(), 0);
    }

    #[tokio::test]
    async fn test_second_login_invalidates_first_state() {
        let (handshake, _, provider) = handshake(StubProvider::default());
        let session = SessionId::generate();

        let first = handshake.begin_login(&session).await.unwrap();
        let second = handshake.begin_login(&session).await.unwrap();
        assert_ne!(state_from(&first), state_from(&second));

        let err = handshake
            .handle_callback(&session, "the-code", &state_from(&first))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CsrfMismatch));
        assert_eq!(provider.exchanges(), 0);
    }

    #[tokio::test]
    async fn test_exchange_failure_resets_attempt() {
        let (handshake, store, provider) = handshake(StubProvider {
            fail_exchange: true,
            ..StubProvider::default()
        });
        let session = SessionId::generate();

        let url = handshake.begin_login(&session).await.unwrap();
        let err = handshake
            .handle_callback(&session, "bad-code", &state_from(&url))
            .await
            .unwrap_err();

        match err {
            Error::ExchangeFailed(detail) => assert!(detail.contains("invalid_grant")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.exchanges(), 1);
        assert!(store.get_state(&session).await.unwrap().is_none());
        assert!(store.get_credential(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_relogin_keeps_existing_credential() {
        let (handshake, store, _) = handshake(StubProvider::default());
        let session = SessionId::generate();
        let credential = credential_expiring_in(3600);
        store.put_credential(&session, &credential).await.unwrap();

        handshake.begin_login(&session).await.unwrap();
        let _ = handshake
            .handle_callback(&session, "the-code", "wrong")
            .await;

        assert_eq!(
            store.get_credential(&session).await.unwrap(),
            Some(credential)
        );
    }

    #[tokio::test]
    async fn test_cancel_login_clears_state() {
        let (handshake, store, _) = handshake(StubProvider::default());
        let session = SessionId::generate();

        handshake.begin_login(&session).await.unwrap();
        handshake.cancel_login(&session).await.unwrap();

        assert!(store.get_state(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_callbacks_exchange_once() {
        let (handshake, store, provider) = handshake(StubProvider {
            exchange_delay: Duration::from_millis(50),
            ..StubProvider::default()
        });
        let session = SessionId::generate();
        let state = state_from(&handshake.begin_login(&session).await.unwrap());

        let (a, b) = tokio::join!(
            handshake.handle_callback(&session, "the-code", &state),
            handshake.handle_callback(&session, "the-code", &state)
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert!(matches!(a.err().or(b.err()), Some(Error::CsrfMismatch)));
        assert_eq!(provider.exchanges(), 1);
        assert!(store.get_credential(&session).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_during_pending_exchange_stays_valid() {
        let (handshake, _, provider) = handshake(StubProvider {
            exchange_delay: Duration::from_millis(50),
            ..StubProvider::default()
        });
        let session = SessionId::generate();
        let first = state_from(&handshake.begin_login(&session).await.unwrap());

        let (completed, newest) = tokio::join!(
            handshake.handle_callback(&session, "first-code", &first),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                handshake.begin_login(&session).await
            }
        );
        completed.unwrap();

        let newest = state_from(&newest.unwrap());
        handshake
            .handle_callback(&session, "second-code", &newest)
            .await
            .unwrap();
        assert_eq!(provider.exchanges(), 2);
    }

    #[tokio::test]
    async fn test_unusable_expiry_fails_exchange() {
        let (handshake, store, _) = handshake(StubProvider {
            expires_in: i64::MAX,
            ..StubProvider::default()
        });
        let session = SessionId::generate();

        let url = handshake.begin_login(&session).await.unwrap();
        let err = handshake
            .handle_callback(&session, "the-code", &state_from(&url))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ExchangeFailed(_)));
        assert!(store.get_credential(&session).await.unwrap().is_none());
    }
}
