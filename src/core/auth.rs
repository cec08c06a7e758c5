use std::sync::Arc;

use crate::error::AppError;
use crate::models::Session;
use crate::services::{AdoptionClient, ServiceError, SessionStore};

/// Views the application navigates between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Entry,
    Search,
    Match,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Entry => "/",
            Route::Search => "/search",
            Route::Match => "/match",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Entry)
    }
}

/// Owns the session lifecycle
///
/// Every flow that talks to the adoption service passes its results through
/// [`AuthController::intercept`], so an unauthorized response anywhere ends in
/// the same logout.
pub struct AuthController {
    client: Arc<AdoptionClient>,
    sessions: SessionStore,
}

impl AuthController {
    pub fn new(client: Arc<AdoptionClient>, sessions: SessionStore) -> Self {
        Self { client, sessions }
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    /// Log in and persist the session; returns where to go next
    pub async fn login(&self, name: &str, email: &str) -> Result<Route, AppError> {
        if let Err(e) = self.client.login(name, email).await {
            tracing::error!("Authentication error for {}: {}", email, e);
            return Err(AppError::Auth(match e {
                ServiceError::Unauthorized => "the service rejected these credentials".to_string(),
                other => other.to_string(),
            }));
        }

        self.sessions.save(&Session::new(name, email))?;
        tracing::info!("Logged in as {}", email);
        Ok(Route::Search)
    }

    /// Tell the service we are leaving, then always drop the local session
    pub async fn logout(&self) -> Route {
        match self.client.logout().await {
            Ok(()) => tracing::debug!("Service logout acknowledged"),
            Err(e) => tracing::warn!("Logout failed on server, proceeding with local logout: {}", e),
        }

        if let Err(e) = self.sessions.clear() {
            tracing::error!("Failed to clear stored session: {}", e);
        }

        tracing::info!("Logged out");
        Route::Entry
    }

    /// Redirect target for a navigation, if the user may not see `target`
    pub fn enforce(&self, target: Route) -> Option<Route> {
        if target.requires_auth() && !self.is_authenticated() {
            tracing::debug!("No session, redirecting {} to entry", target.path());
            return Some(Route::Entry);
        }
        None
    }

    /// Normalize a service result at a flow boundary
    ///
    /// `Unauthorized` logs the user out and is returned as-is for the caller
    /// to redirect; everything else becomes `RequestFailed`.
    pub async fn intercept<T>(&self, result: Result<T, ServiceError>) -> Result<T, AppError> {
        match result {
            Ok(value) => Ok(value),
            Err(ServiceError::Unauthorized) => {
                tracing::info!("Session rejected by the service, logging out");
                self.logout().await;
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(AppError::RequestFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_and_guards() {
        assert_eq!(Route::Entry.path(), "/");
        assert_eq!(Route::Search.path(), "/search");
        assert!(!Route::Entry.requires_auth());
        assert!(Route::Search.requires_auth());
        assert!(Route::Match.requires_auth());
    }
}
