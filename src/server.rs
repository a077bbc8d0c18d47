use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    Res, api,
    config::{Config, StoreKind},
    management::{
        FileStore, MemoryStore, OAuthHandshake, PlaylistManager, SessionStore, TokenManager,
    },
    session::CookieSettings,
    spotify::{OAuthProvider, PlaylistApi, SpotifyClient},
};

/// Shared state of the route handlers.
#[derive(Clone)]
pub struct AppState {
    pub handshake: Arc<OAuthHandshake>,
    pub playlists: Arc<PlaylistManager>,
    pub cookies: CookieSettings,
    pub frontend_url: String,
}

impl AppState {
    /// Wires the flows on top of the given store and Spotify implementations.
    pub fn new(
        config: &Config,
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn OAuthProvider>,
        api: Arc<dyn PlaylistApi>,
    ) -> Self {
        let tokens = Arc::new(TokenManager::new(Arc::clone(&store), Arc::clone(&provider)));

        AppState {
            handshake: Arc::new(OAuthHandshake::new(store, provider)),
            playlists: Arc::new(PlaylistManager::new(tokens, api)),
            cookies: CookieSettings {
                secure: config.cookie_secure,
                max_age_secs: config.cookie_max_age_secs,
            },
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// Production wiring: the real Spotify client and the configured store.
    pub async fn from_config(config: &Config) -> Res<Self> {
        let store: Arc<dyn SessionStore> = match config.store {
            StoreKind::Memory => Arc::new(MemoryStore::with_ttl(Duration::from_secs(
                config.cookie_max_age_secs.unsigned_abs(),
            ))),
            StoreKind::File => Arc::new(FileStore::new(config.store_dir.clone()).await?),
        };
        let client = Arc::new(SpotifyClient::new(config)?);

        Ok(Self::new(config, store, client.clone(), client))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/create-playlist", post(api::create_playlist))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Res<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
