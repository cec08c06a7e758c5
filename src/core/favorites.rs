use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::services::storage::{get_json, set_json, Storage};

/// Storage key holding the favorited dog ids
pub const FAVORITES_KEY: &str = "favorites";

/// Tracks which dogs the user has favorited
///
/// The persisted set is read once at construction and rewritten after every toggle.
pub struct FavoritesTracker {
    storage: Arc<dyn Storage>,
    ids: Mutex<BTreeSet<String>>,
}

impl FavoritesTracker {
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let ids = match get_json::<Vec<String>>(storage.as_ref(), FAVORITES_KEY) {
            Ok(Some(ids)) => {
                tracing::info!("Loaded {} favorites from storage", ids.len());
                ids.into_iter().collect()
            }
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!("Error loading favorites from storage, starting empty: {}", e);
                BTreeSet::new()
            }
        };

        Self {
            storage,
            ids: Mutex::new(ids),
        }
    }

    /// Flip membership of `id` and persist; returns whether it is now a favorite
    pub async fn toggle(&self, id: &str) -> Result<bool, AppError> {
        let mut ids = self.ids.lock().await;

        let favorited = if ids.remove(id) {
            tracing::info!("Removed dog {} from favorites", id);
            false
        } else {
            ids.insert(id.to_string());
            tracing::info!("Added dog {} to favorites", id);
            true
        };

        let persisted: Vec<&String> = ids.iter().collect();
        if let Err(e) = set_json(self.storage.as_ref(), FAVORITES_KEY, &persisted) {
            // keep memory and storage in step
            if favorited {
                ids.remove(id);
            } else {
                ids.insert(id.to_string());
            }
            return Err(e.into());
        }

        tracing::debug!("Saved {} favorites to storage", ids.len());
        Ok(favorited)
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.ids.lock().await.contains(id)
    }

    pub async fn snapshot(&self) -> BTreeSet<String> {
        self.ids.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }
}
