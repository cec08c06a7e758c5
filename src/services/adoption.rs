use crate::models::{DogRecord, MatchResponse, SearchResultPage};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the adoption service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Unauthorized: session missing or expired")]
    Unauthorized,

    #[error("API returned {status}: {body}")]
    ApiError { status: StatusCode, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the external adoption service
///
/// Authentication is the service's session cookie, so one client (and its
/// cookie jar) must be shared by every flow.
pub struct AdoptionClient {
    base_url: String,
    client: Client,
}

impl AdoptionClient {
    /// Create a new adoption service client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /auth/login; the service sets the session cookie on success
    pub async fn login(&self, name: &str, email: &str) -> Result<(), ServiceError> {
        let url = self.url("/auth/login");
        tracing::debug!("Logging in as {} via {}", email, url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": name, "email": email }))
            .send()
            .await?;

        check_status(response, "login").await?;
        Ok(())
    }

    /// POST /auth/logout
    pub async fn logout(&self) -> Result<(), ServiceError> {
        let response = self.client.post(self.url("/auth/logout")).send().await?;
        check_status(response, "logout").await?;
        Ok(())
    }

    /// GET /dogs/breeds
    pub async fn breeds(&self) -> Result<Vec<String>, ServiceError> {
        let url = self.url("/dogs/breeds");
        tracing::debug!("Fetching breeds from: {}", url);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response, "fetch breeds").await?;
        decode(response).await
    }

    /// GET /dogs/search with already encoded query parameters
    pub async fn search(&self, params: &[(&str, String)]) -> Result<SearchResultPage, ServiceError> {
        let url = self.url("/dogs/search");

        let response = self.client.get(&url).query(params).send().await?;
        tracing::debug!("Search {} -> {}", response.url(), response.status());

        let response = check_status(response, "search dogs").await?;
        decode(response).await
    }

    /// POST /dogs with the identifiers to resolve
    pub async fn dogs(&self, ids: &[String]) -> Result<Vec<DogRecord>, ServiceError> {
        let url = self.url("/dogs");
        tracing::debug!("Fetching details for {} dogs", ids.len());

        let response = self.client.post(&url).json(ids).send().await?;
        let response = check_status(response, "fetch dog details").await?;
        decode(response).await
    }

    /// POST /dogs/match with the favorited identifiers, returning the matched id
    pub async fn match_dog(&self, favorite_ids: &[String]) -> Result<String, ServiceError> {
        let url = self.url("/dogs/match");
        tracing::debug!("Requesting match from {} favorites", favorite_ids.len());

        let response = self.client.post(&url).json(favorite_ids).send().await?;
        let response = check_status(response, "generate match").await?;
        let body: MatchResponse = decode(response).await?;
        Ok(body.matched_id)
    }
}

/// Map 401 to `Unauthorized` and any other non-2xx to `ApiError`
async fn check_status(response: Response, action: &str) -> Result<Response, ServiceError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        tracing::info!("Unauthorized response to {}", action);
        return Err(ServiceError::Unauthorized);
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Failed to {}: {} - {}", action, status, body);
        return Err(ServiceError::ApiError { status, body });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}
