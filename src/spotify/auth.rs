use async_trait::async_trait;

use super::{OAuthProvider, SpotifyClient, SpotifyError, decode_token};
use crate::types::TokenResponse;

#[async_trait]
impl OAuthProvider for SpotifyClient {
    /// Constructs the consent page URL.
    ///
    /// The user is sent here by `/login`; Spotify redirects back to the
    /// configured redirect URI with `code` and the same `state`.
    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("state", state);
        url.into()
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Completes the authorization code flow. The client authenticates with
    /// its secret, and `redirect_uri` must be the exact value sent to the
    /// consent page.
    ///
    /// # Errors
    ///
    /// Common failure scenarios:
    /// - Invalid, expired or already used authorization code (`invalid_grant`)
    /// - Redirect URI doesn't match the one registered for the client
    /// - Network connectivity issues
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError> {
        let res = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        decode_token(res).await
    }

    /// Refreshes an expired access token using a refresh token.
    ///
    /// The response may or may not carry a rotated refresh token; callers keep
    /// the old one when it doesn't.
    ///
    /// # Errors
    ///
    /// An `invalid_grant` answer means the refresh token was revoked, see
    /// [`SpotifyError::is_revoked`].
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        let res = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        decode_token(res).await
    }
}
