use std::{
    collections::HashMap,
    io::Error,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    session::SessionId,
    types::{Credential, SessionEntry},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Authorization state keyed by session id.
///
/// Holds the pending CSRF state of a login attempt and, once the handshake
/// completes, the session's credential. Entries of different sessions never
/// interfere; concurrent writes for the same session are last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put_state(&self, session: &SessionId, csrf_state: &str) -> Result<(), StoreError>;

    async fn get_state(&self, session: &SessionId) -> Result<Option<String>, StoreError>;

    /// Removes and returns the pending state in one step, so a state can be
    /// consumed at most once.
    async fn take_state(&self, session: &SessionId) -> Result<Option<String>, StoreError>;

    async fn clear_state(&self, session: &SessionId) -> Result<(), StoreError>;

    async fn put_credential(
        &self,
        session: &SessionId,
        credential: &Credential,
    ) -> Result<(), StoreError>;

    async fn get_credential(&self, session: &SessionId) -> Result<Option<Credential>, StoreError>;

    async fn delete_credential(&self, session: &SessionId) -> Result<(), StoreError>;
}

#[derive(Debug)]
struct Slot {
    entry: SessionEntry,
    touched: Instant,
}

/// Single-process store.
///
/// With a time to live, entries untouched for that long are invisible to
/// reads and dropped on the next write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<SessionId, Slot>>,
    ttl: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        MemoryStore {
            entries: RwLock::default(),
            ttl: Some(ttl),
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|slot| self.is_live(slot, now)).count()
    }

    fn is_live(&self, slot: &Slot, now: Instant) -> bool {
        self.ttl.is_none_or(|ttl| now.duration_since(slot.touched) < ttl)
    }

    async fn read<T, F>(&self, session: &SessionId, f: F) -> Option<T>
    where
        F: FnOnce(&SessionEntry) -> Option<T>,
    {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(session)
            .filter(|slot| self.is_live(slot, now))
            .and_then(|slot| f(&slot.entry))
    }

    async fn update<T, F>(&self, session: &SessionId, f: F) -> T
    where
        F: FnOnce(&mut SessionEntry) -> T + Send,
    {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if self.ttl.is_some() {
            entries.retain(|_, slot| self.is_live(slot, now));
        }

        let slot = entries.entry(session.clone()).or_insert_with(|| Slot {
            entry: SessionEntry::default(),
            touched: now,
        });
        let out = f(&mut slot.entry);
        slot.touched = now;
        if slot.entry.is_empty() {
            entries.remove(session);
        }
        out
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put_state(&self, session: &SessionId, csrf_state: &str) -> Result<(), StoreError> {
        self.update(session, |entry| {
            entry.csrf_state = Some(csrf_state.to_string())
        })
        .await;
        Ok(())
    }

    async fn get_state(&self, session: &SessionId) -> Result<Option<String>, StoreError> {
        Ok(self.read(session, |e| e.csrf_state.clone()).await)
    }

    async fn take_state(&self, session: &SessionId) -> Result<Option<String>, StoreError> {
        Ok(self.update(session, |entry| entry.csrf_state.take()).await)
    }

    async fn clear_state(&self, session: &SessionId) -> Result<(), StoreError> {
        self.update(session, |entry| entry.csrf_state = None).await;
        Ok(())
    }

    async fn put_credential(
        &self,
        session: &SessionId,
        credential: &Credential,
    ) -> Result<(), StoreError> {
        self.update(session, |entry| entry.credential = Some(credential.clone()))
            .await;
        Ok(())
    }

    async fn get_credential(&self, session: &SessionId) -> Result<Option<Credential>, StoreError> {
        Ok(self.read(session, |e| e.credential.clone()).await)
    }

    async fn delete_credential(&self, session: &SessionId) -> Result<(), StoreError> {
        self.update(session, |entry| entry.credential = None).await;
        Ok(())
    }
}
