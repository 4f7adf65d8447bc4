//! Single-slot session persisted in the key-value store.

use chrono::Utc;
use std::sync::Arc;

use crate::storage::{KeyValueStore, KeyValueStoreExt, StorageError, SESSION_KEY};
use crate::user::{Session, UserRecord};

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record `user` as signed in, replacing any previous session.
    pub fn save(&self, user: &UserRecord) -> Result<Session, StorageError> {
        let session = Session::for_user(user, Utc::now());
        self.store.set_json(SESSION_KEY, &session)?;
        tracing::info!("Signed in as {}", session.username);
        Ok(session)
    }

    /// The stored session; an unreadable record counts as signed out.
    pub fn current(&self) -> Result<Option<Session>, StorageError> {
        match self.store.get_json::<Session>(SESSION_KEY) {
            Ok(session) => Ok(session),
            Err(StorageError::Serialization(e)) => {
                tracing::warn!("Unable to parse stored session: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SESSION_KEY)?;
        tracing::info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::storage::MemoryStore;

    fn user(username: &str) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            password: "secret1".to_string(),
            name: format!("{} Name", username),
            role: "member".to_string(),
            created_at: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_save_overwrites_previous_session() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(sessions.current().unwrap(), None);

        sessions.save(&user("ann")).unwrap();
        sessions.save(&user("bob")).unwrap();

        let current = sessions.current().unwrap().unwrap();
        assert_eq!(current.username, "bob");
        assert_eq!(current.name, "bob Name");
    }

    #[test]
    fn test_clear() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        sessions.save(&user("ann")).unwrap();
        sessions.clear().unwrap();
        assert_eq!(sessions.current().unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_is_signed_out() {
        let store = Arc::new(MemoryStore::new());
        store.set(SESSION_KEY, "not json").unwrap();
        let sessions = SessionStore::new(store);
        assert_eq!(sessions.current().unwrap(), None);
    }
}
