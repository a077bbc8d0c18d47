mod auth;
mod file_store;
mod handshake;
mod locks;
mod playlist;
mod state;

pub use auth::DEFAULT_REFRESH_MARGIN_SECS;
pub use auth::TokenManager;
pub use file_store::FileStore;
pub use handshake::OAuthHandshake;
pub use locks::KeyedLocks;
pub use playlist::DEFAULT_PLAYLIST_NAME;
pub use playlist::PLAYLIST_DESCRIPTION;
pub use playlist::PlaylistManager;
pub use state::MemoryStore;
pub use state::SessionStore;
pub use state::StoreError;
