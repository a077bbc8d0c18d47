//! Session cookie identity.
//!
//! Every browser gets an opaque identifier in an `HttpOnly`, `SameSite=Lax`
//! cookie. All state kept by the server (pending CSRF state, cached
//! credential) is keyed by this identifier only.

use std::fmt;

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;

use crate::utils;

pub const SESSION_COOKIE_NAME: &str = "session_id";

const MIN_ID_LEN: usize = 16;
const MAX_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(utils::generate_token(utils::TOKEN_LENGTH))
    }

    /// Accepts a cookie value only if it looks like an id this server minted.
    pub fn parse(value: &str) -> Option<Self> {
        let valid = (MIN_ID_LEN..=MAX_ID_LEN).contains(&value.len())
            && value.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| SessionId(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: SessionId,
    /// The id was minted for this request and the cookie still has to be set.
    pub is_new: bool,
}

/// Cookie attributes for the session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: i64,
}

/// Returns the session id carried by the request, if it is valid.
pub fn existing(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE_NAME)
        .and_then(|cookie| SessionId::parse(cookie.value()))
}

/// Returns the request's session id, minting a new one only when none is present.
///
/// Reusing a valid id matters: a second mint would orphan a handshake that is
/// already in flight for this browser.
pub fn resolve(jar: &CookieJar) -> ResolvedSession {
    match existing(jar) {
        Some(id) => ResolvedSession { id, is_new: false },
        None => ResolvedSession {
            id: SessionId::generate(),
            is_new: true,
        },
    }
}

pub fn session_cookie(id: &SessionId, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, id.as_str().to_string()))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(settings.max_age_secs))
        .build()
}
