// Client flow exports
pub mod auth;
pub mod favorites;
pub mod matching;
pub mod query;
pub mod search;

pub use auth::{AuthController, Route};
pub use favorites::{FavoritesTracker, FAVORITES_KEY};
pub use matching::MatchViewModel;
pub use query::{build_search_query, extract_from_cursor};
pub use search::{QueryOutcome, SearchStatus, SearchView, SearchViewModel};
