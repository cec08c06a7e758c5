use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::auth::AuthController;
use crate::error::AppError;
use crate::models::DogRecord;
use crate::services::{AdoptionClient, ServiceError};

/// Message shown when a match attempt fails for any reason other than the session
pub const MATCH_FAILED: &str = "Error generating match. Please try again.";

/// Runs the match flow: favorites in, one dog out
///
/// Nothing is cached between runs and the favorite set is only read.
pub struct MatchViewModel {
    client: Arc<AdoptionClient>,
    auth: Arc<AuthController>,
}

impl MatchViewModel {
    pub fn new(client: Arc<AdoptionClient>, auth: Arc<AuthController>) -> Self {
        Self { client, auth }
    }

    /// Ask the service to pick one dog from `favorites` and resolve its record
    ///
    /// An empty set fails with `NoFavorites` before any request is made.
    pub async fn request_match(&self, favorites: &BTreeSet<String>) -> Result<DogRecord, AppError> {
        if favorites.is_empty() {
            return Err(AppError::NoFavorites);
        }

        let ids: Vec<String> = favorites.iter().cloned().collect();
        tracing::info!("Generating match from {} favorites", ids.len());

        let result = self.fetch_match(&ids).await;
        let dog = self.auth.intercept(result).await.map_err(|e| {
            if !matches!(e, AppError::Unauthorized) {
                tracing::error!("Error in match flow: {}", e);
            }
            e
        })?;

        tracing::info!("Matched with dog {} ({})", dog.id, dog.name);
        Ok(dog)
    }

    async fn fetch_match(&self, ids: &[String]) -> Result<DogRecord, ServiceError> {
        let matched_id = self.client.match_dog(ids).await?;
        tracing::debug!("Matched with dog id: {}", matched_id);

        self.client
            .dogs(std::slice::from_ref(&matched_id))
            .await?
            .into_iter()
            .find(|dog| dog.id == matched_id)
            .ok_or_else(|| ServiceError::InvalidResponse(format!("matched dog {} was not returned", matched_id)))
    }
}
