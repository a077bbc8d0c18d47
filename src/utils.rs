use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Length of generated session identifiers and CSRF state values.
pub const TOKEN_LENGTH: usize = 43;

const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Random alphanumeric token drawn from the thread-local CSPRNG.
pub fn generate_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Filesystem-safe digest of an arbitrary key.
pub fn hash_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Turns a bare track id into a `spotify:track:` URI.
///
/// Values that already are Spotify URIs are kept as they are.
pub fn to_track_uri(identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier.starts_with("spotify:") {
        identifier.to_string()
    } else {
        format!("{TRACK_URI_PREFIX}{identifier}")
    }
}

/// Appends query parameters to a URL that may or may not already carry a query.
pub fn append_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        return base.to_string();
    }

    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}
