use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::found;
use crate::{server::AppState, session};

/// Starts the Spotify login and redirects to the consent page.
///
/// The session cookie is only set when this request minted a new session; a
/// valid cookie is reused untouched.
pub async fn login(State(app): State<AppState>, jar: CookieJar) -> Response {
    let resolved = session::resolve(&jar);

    let auth_url = match app.handshake.begin_login(&resolved.id).await {
        Ok(url) => url,
        Err(e) => return e.into_response(),
    };

    let jar = if resolved.is_new {
        tracing::debug!(session = %resolved.id, "new session issued");
        jar.add(session::session_cookie(&resolved.id, &app.cookies))
    } else {
        jar
    };

    (jar, found(&auth_url)).into_response()
}
