use std::sync::Arc;

use crate::models::Session;
use crate::services::storage::{get_json, set_json, Storage, StorageError};

/// Storage key holding the signed-in user
pub const SESSION_KEY: &str = "userInfo";

/// Persists the signed-in user's identity
///
/// A stored session is the authenticated flag; there is no separate boolean.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The stored session, if any. An unreadable value counts as signed out.
    pub fn load(&self) -> Option<Session> {
        match get_json::<Session>(self.storage.as_ref(), SESSION_KEY) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored session: {}", e);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        set_json(self.storage.as_ref(), SESSION_KEY, session)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.load().is_some()
    }
}
