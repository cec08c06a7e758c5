//! Pawmatch - dog adoption search and matching client
//!
//! Talks to the external adoption service for authentication, catalog search,
//! dog lookup and matching, and renders the results as a small local web app.
//! All ranking and matching happen in the service; this crate owns the filter
//! state, cursor pagination, favorites and session lifecycle.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_search_query, extract_from_cursor, AuthController, FavoritesTracker, MatchViewModel, Route, SearchViewModel};
pub use error::AppError;
pub use models::{DogRecord, FilterState, PageDirection, SearchResultPage, Session, SortSpec};
