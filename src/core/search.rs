use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::auth::AuthController;
use crate::core::query::{build_search_query, extract_from_cursor, to_query_string};
use crate::error::AppError;
use crate::models::{DogRecord, FilterState, PageDirection, SearchResultPage, SortSpec};
use crate::services::{AdoptionClient, ServiceError};

const SEARCH_FAILED: &str = "Error searching for dogs. Please try again.";
const PAGE_FAILED: &str = "Error changing page. Please try again.";
const BREEDS_FAILED: &str = "Error loading dog breeds. Please try again.";

/// Where the current query is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// What happened to a query once its response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Applied,
    /// A newer query was issued while this one was in flight; its result was dropped
    Superseded,
}

/// Snapshot handed to the presentation layer
#[derive(Debug, Clone)]
pub struct SearchView {
    pub dogs: Vec<DogRecord>,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub page_number: u32,
    pub status: SearchStatus,
    pub filters: FilterState,
    pub notice: Option<String>,
}

#[derive(Debug)]
struct SearchState {
    filters: FilterState,
    page: Option<SearchResultPage>,
    dogs: Vec<DogRecord>,
    page_number: u32,
    status: SearchStatus,
    breeds: Vec<String>,
    notice: Option<String>,
    /// Kept apart from `notice` so a successful search does not hide it
    breeds_error: Option<String>,
}

/// A query that has been issued but not yet committed
struct PendingQuery {
    token: u64,
    filters: FilterState,
    step: PageStep,
}

#[derive(Debug, Clone, Copy)]
enum PageStep {
    First,
    Moved(PageDirection),
}

/// Owns the catalog filters and the page currently on display
///
/// Each query takes a fresh generation token. Results are applied only if the
/// token is still the newest, so overlapping queries resolve last-issued-wins
/// regardless of the order their responses arrive in.
pub struct SearchViewModel {
    client: Arc<AdoptionClient>,
    auth: Arc<AuthController>,
    page_size: u32,
    default_sort: SortSpec,
    generation: AtomicU64,
    state: Mutex<SearchState>,
}

impl SearchState {
    fn new(default_sort: SortSpec) -> Self {
        Self {
            filters: FilterState::with_sort(default_sort),
            page: None,
            dogs: Vec::new(),
            page_number: 1,
            status: SearchStatus::Idle,
            breeds: Vec::new(),
            notice: None,
            breeds_error: None,
        }
    }
}

impl SearchViewModel {
    pub fn new(client: Arc<AdoptionClient>, auth: Arc<AuthController>, page_size: u32, default_sort: SortSpec) -> Self {
        Self {
            client,
            auth,
            page_size,
            default_sort,
            generation: AtomicU64::new(0),
            state: Mutex::new(SearchState::new(default_sort)),
        }
    }

    /// Forget filters and results, e.g. when a new session starts
    ///
    /// Bumping the generation also drops any query still in flight.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = SearchState::new(self.default_sort);
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn view(&self) -> SearchView {
        let state = self.state.lock().await;
        let (total, has_next, has_prev) = match &state.page {
            Some(page) => (page.total, page.has_next(), page.has_prev()),
            None => (0, false, false),
        };

        SearchView {
            dogs: state.dogs.clone(),
            total,
            has_next,
            has_prev,
            page_number: state.page_number,
            status: state.status.clone(),
            filters: state.filters.clone(),
            notice: state.notice.clone().or_else(|| state.breeds_error.clone()),
        }
    }

    pub async fn filters(&self) -> FilterState {
        self.state.lock().await.filters.clone()
    }

    pub async fn set_notice(&self, message: String) {
        self.state.lock().await.notice = Some(message);
    }

    pub async fn dismiss_notice(&self) {
        let mut state = self.state.lock().await;
        state.notice = None;
        state.breeds_error = None;
    }

    /// Fetch the breed catalog used by the breed filter
    pub async fn load_breeds(&self) -> Result<Vec<String>, AppError> {
        tracing::info!("Fetching dog breeds");
        let result = self.client.breeds().await;

        match self.auth.intercept(result).await {
            Ok(breeds) => {
                tracing::info!("Received {} breeds", breeds.len());
                let mut state = self.state.lock().await;
                state.breeds = breeds.clone();
                state.breeds_error = None;
                Ok(breeds)
            }
            Err(AppError::Unauthorized) => Err(AppError::Unauthorized),
            Err(e) => {
                tracing::error!("Error fetching breeds: {}", e);
                self.state.lock().await.breeds_error = Some(BREEDS_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Known breeds whose name contains `term`, ignoring case
    pub async fn breeds_matching(&self, term: &str) -> Vec<String> {
        let term = term.trim().to_lowercase();
        self.state
            .lock()
            .await
            .breeds
            .iter()
            .filter(|breed| breed.to_lowercase().contains(&term))
            .cloned()
            .collect()
    }

    /// Replace all filters at once and re-query from the first page
    pub async fn apply_filters(&self, filters: FilterState) -> Result<QueryOutcome, AppError> {
        {
            let mut state = self.state.lock().await;
            if let Err(e) = check_known_breeds(filters.breeds(), &state.breeds) {
                state.notice = Some(e.to_string());
                return Err(e);
            }
            tracing::info!("Filters changed, sort={}", filters.sort());
            state.filters = filters;
        }
        self.refresh().await
    }

    pub async fn set_breeds(&self, breeds: Vec<String>) -> Result<QueryOutcome, AppError> {
        let mut filters = self.filters().await;
        filters.set_breeds(breeds);
        self.apply_filters(filters).await
    }

    pub async fn set_sort(&self, sort: SortSpec) -> Result<QueryOutcome, AppError> {
        let mut filters = self.filters().await;
        filters.set_sort(sort);
        self.apply_filters(filters).await
    }

    pub async fn set_age_range(&self, min: Option<u32>, max: Option<u32>) -> Result<QueryOutcome, AppError> {
        let mut filters = self.filters().await;
        filters.set_age_range(min, max)?;
        self.apply_filters(filters).await
    }

    pub async fn set_zip_codes(&self, zip_codes: Vec<String>) -> Result<QueryOutcome, AppError> {
        let mut filters = self.filters().await;
        filters.set_zip_codes(zip_codes)?;
        self.apply_filters(filters).await
    }

    /// Query the first page for the current filters
    pub async fn refresh(&self) -> Result<QueryOutcome, AppError> {
        let pending = self.begin(PageStep::First).await;
        self.run(pending, None).await
    }

    /// Follow the current page's cursor in `direction`
    ///
    /// Without a cursor in that direction this fails with `NoSuchPage` and
    /// the displayed page is left exactly as it was.
    pub async fn go_to_page(&self, direction: PageDirection) -> Result<QueryOutcome, AppError> {
        let from = {
            let mut state = self.state.lock().await;
            let from = state
                .page
                .as_ref()
                .and_then(|page| page.cursor(direction))
                .ok_or(AppError::NoSuchPage)
                .and_then(extract_from_cursor);

            match from {
                Ok(from) => from,
                Err(e) => {
                    tracing::info!("No {:?} page to move to", direction);
                    state.notice = Some(e.to_string());
                    return Err(e);
                }
            }
        };

        let pending = self.begin(PageStep::Moved(direction)).await;
        self.run(pending, Some(from)).await
    }

    async fn begin(&self, step: PageStep) -> PendingQuery {
        let mut state = self.state.lock().await;
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.status = SearchStatus::Loading;
        if let PageStep::First = step {
            // the old page and its cursors belong to the previous filters
            state.page = None;
            state.dogs.clear();
            state.page_number = 1;
        }
        PendingQuery {
            token,
            filters: state.filters.clone(),
            step,
        }
    }

    async fn run(&self, pending: PendingQuery, from: Option<String>) -> Result<QueryOutcome, AppError> {
        let params = build_search_query(&pending.filters, self.page_size, from.as_deref());
        tracing::info!("Sending search request #{}: {}", pending.token, to_query_string(&params));

        let result = self.fetch(&params).await;
        let result = self.auth.intercept(result).await;
        self.commit(pending, result).await
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<(SearchResultPage, Vec<DogRecord>), ServiceError> {
        let page = self.client.search(params).await?;
        page.check(self.page_size).map_err(ServiceError::InvalidResponse)?;
        tracing::debug!(
            "Search returned {} dog ids out of {} total",
            page.result_ids.len(),
            page.total
        );

        if page.result_ids.is_empty() {
            return Ok((page, Vec::new()));
        }

        let dogs = self.client.dogs(&page.result_ids).await?;
        Ok((page, dogs))
    }

    async fn commit(
        &self,
        pending: PendingQuery,
        result: Result<(SearchResultPage, Vec<DogRecord>), AppError>,
    ) -> Result<QueryOutcome, AppError> {
        let mut state = self.state.lock().await;

        if self.generation.load(Ordering::SeqCst) != pending.token {
            tracing::debug!("Discarding stale search response #{}", pending.token);
            return Ok(QueryOutcome::Superseded);
        }

        match result {
            Ok((page, dogs)) => {
                state.page_number = match pending.step {
                    PageStep::First => 1,
                    PageStep::Moved(PageDirection::Next) => state.page_number + 1,
                    PageStep::Moved(PageDirection::Prev) => state.page_number.saturating_sub(1).max(1),
                };
                state.page = Some(page);
                state.dogs = dogs;
                state.status = SearchStatus::Ready;
                state.notice = None;
                tracing::info!("Showing {} dogs (page {})", state.dogs.len(), state.page_number);
                Ok(QueryOutcome::Applied)
            }
            Err(AppError::Unauthorized) => {
                state.status = SearchStatus::Idle;
                Err(AppError::Unauthorized)
            }
            Err(e) => {
                let message = match pending.step {
                    PageStep::First => SEARCH_FAILED,
                    PageStep::Moved(_) => PAGE_FAILED,
                };
                tracing::error!("Search request #{} failed: {}", pending.token, e);
                state.status = SearchStatus::Failed(message.to_string());
                state.notice = Some(message.to_string());
                Err(e)
            }
        }
    }
}

fn check_known_breeds(selected: &BTreeSet<String>, known: &[String]) -> Result<(), AppError> {
    // the catalog may not have loaded yet; the service validates in that case
    if known.is_empty() {
        return Ok(());
    }
    match selected.iter().find(|breed| !known.contains(breed)) {
        Some(unknown) => Err(AppError::InvalidFilter(format!("unknown breed {:?}", unknown))),
        None => Ok(()),
    }
}
