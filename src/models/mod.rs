// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{DogRecord, FilterState, MatchResponse, PageDirection, SearchResultPage, Session, SortDirection, SortField, SortSpec};
pub use requests::LoginRequest;
pub use responses::{ErrorResponse, HealthResponse};
