use axum::{
    extract::{Query, State},
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::found;
use crate::{error::Error, server::AppState, session, utils};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Completes the Spotify login and sends the browser back to the frontend.
pub async fn callback(
    State(app): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(session) = session::existing(&jar) else {
        tracing::warn!("callback without a session cookie");
        return login_error(&app, "Missing session. Please try logging in again.");
    };

    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("no description");
        tracing::warn!(session = %session, error = %error, description = %desc, "authorization denied by Spotify");
        if let Err(e) = app.handshake.cancel_login(&session).await {
            tracing::error!(session = %session, error = %e, "failed to clear pending login");
        }
        return login_error(&app, &format!("Spotify authorization failed: {error}"));
    }

    let (Some(code), Some(returned_state)) = (params.code, params.state) else {
        if let Err(e) = app.handshake.cancel_login(&session).await {
            tracing::error!(session = %session, error = %e, "failed to clear pending login");
        }
        return login_error(&app, "Missing authorization code or state.");
    };

    match app
        .handshake
        .handle_callback(&session, &code, &returned_state)
        .await
    {
        Ok(()) => found(&utils::append_query(
            &app.frontend_url,
            &[("spotify_auth", "success")],
        )),
        Err(Error::CsrfMismatch) => {
            login_error(&app, "State mismatch. Please try logging in again.")
        }
        Err(Error::ExchangeFailed(_)) => login_error(&app, "Could not get access token."),
        Err(e) => {
            tracing::error!(session = %session, error = %e, "login could not be completed");
            login_error(&app, "Could not complete login.")
        }
    }
}

fn login_error(app: &AppState, message: &str) -> Response {
    found(&utils::append_query(
        &app.frontend_url,
        &[("spotify_auth", "error"), ("error", message)],
    ))
}
