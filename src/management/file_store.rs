use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use super::{
    locks::KeyedLocks,
    state::{SessionStore, StoreError},
};
use crate::{
    session::SessionId,
    types::{Credential, SessionEntry},
    utils,
};

/// Store that keeps one JSON file per session.
///
/// Credentials survive a restart of the process. File names are digests of
/// the session id, so cookie values never end up in a path. Every access to a
/// session's file holds that session's lock, and files are replaced by rename
/// so a reader or a crash never sees a partial write.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    locks: KeyedLocks,
}

impl FileStore {
    pub async fn new(dir: PathBuf) -> Result<Self, StoreError> {
        async_fs::create_dir_all(&dir).await?;
        Ok(FileStore {
            dir,
            locks: KeyedLocks::new(),
        })
    }

    fn entry_path(&self, session: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{}.json", utils::hash_key(session.as_str())))
    }

    fn temp_path(&self, session: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{}.json.tmp", utils::hash_key(session.as_str())))
    }

    async fn load(&self, session: &SessionId) -> Result<SessionEntry, StoreError> {
        match async_fs::read_to_string(self.entry_path(session)).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SessionEntry::default()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn persist(&self, session: &SessionId, entry: &SessionEntry) -> Result<(), StoreError> {
        let path = self.entry_path(session);
        if entry.is_empty() {
            return match async_fs::remove_file(&path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::Io(e)),
                _ => Ok(()),
            };
        }

        let json = serde_json::to_string_pretty(entry)?;
        let temp = self.temp_path(session);
        async_fs::write(&temp, json).await?;
        async_fs::rename(&temp, &path).await?;
        Ok(())
    }

    async fn read(&self, session: &SessionId) -> Result<SessionEntry, StoreError> {
        let _guard = self.locks.lock(session.as_str()).await;
        self.load(session).await
    }

    async fn update<T, F>(&self, session: &SessionId, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SessionEntry) -> T + Send,
    {
        let _guard = self.locks.lock(session.as_str()).await;
        let mut entry = self.load(session).await?;
        let out = f(&mut entry);
        self.persist(session, &entry).await?;
        Ok(out)
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn put_state(&self, session: &SessionId, csrf_state: &str) -> Result<(), StoreError> {
        self.update(session, |entry| {
            entry.csrf_state = Some(csrf_state.to_string())
        })
        .await
    }

    async fn get_state(&self, session: &SessionId) -> Result<Option<String>, StoreError> {
        Ok(self.read(session).await?.csrf_state)
    }

    async fn take_state(&self, session: &SessionId) -> Result<Option<String>, StoreError> {
        self.update(session, |entry| entry.csrf_state.take()).await
    }

    async fn clear_state(&self, session: &SessionId) -> Result<(), StoreError> {
        self.update(session, |entry| entry.csrf_state = None).await
    }

    async fn put_credential(
        &self,
        session: &SessionId,
        credential: &Credential,
    ) -> Result<(), StoreError> {
        self.update(session, |entry| entry.credential = Some(credential.clone()))
            .await
    }

    async fn get_credential(&self, session: &SessionId) -> Result<Option<Credential>, StoreError> {
        Ok(self.read(session).await?.credential)
    }

    async fn delete_credential(&self, session: &SessionId) -> Result<(), StoreError> {
        self.update(session, |entry| entry.credential = None).await
    }
}
