use actix_web::{http::header, web, HttpResponse, Responder};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::matching::MATCH_FAILED;
use crate::core::{AuthController, FavoritesTracker, MatchViewModel, Route, SearchStatus, SearchViewModel};
use crate::error::AppError;
use crate::models::{FilterState, HealthResponse, LoginRequest, PageDirection};
use crate::routes::render;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthController>,
    pub search: Arc<SearchViewModel>,
    pub favorites: Arc<FavoritesTracker>,
    pub matcher: Arc<MatchViewModel>,
}

/// Configure all page routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/", web::get().to(entry))
        .route("/login", web::get().to(entry))
        .route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout))
        .route("/search", web::get().to(search))
        .route("/search/filters", web::post().to(apply_filters))
        .route("/search/page/{direction}", web::post().to(change_page))
        .route("/search/notice/dismiss", web::post().to(dismiss_notice))
        .route("/favorites/{id}", web::post().to(toggle_favorite))
        .route("/match", web::get().to(find_match));
}

pub fn redirect(route: Route) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, route.path()))
        .finish()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Redirect response when the session does not allow navigating to `target`
fn guard(state: &AppState, target: Route) -> Option<HttpResponse> {
    state.auth.enforce(target).map(redirect)
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

async fn entry(state: web::Data<AppState>) -> impl Responder {
    html(render::entry_page(state.auth.session().as_ref(), None))
}

/// POST /login
async fn login(state: web::Data<AppState>, form: web::Form<LoginRequest>) -> impl Responder {
    let form = form.into_inner().trimmed();
    if let Some(problem) = form.first_problem() {
        tracing::info!("Rejected login form: {}", problem);
        return html(render::entry_page(None, Some(&problem)));
    }

    match state.auth.login(&form.name, &form.email).await {
        Ok(route) => {
            state.search.reset().await;
            redirect(route)
        }
        Err(e) => {
            let message = match e {
                AppError::Auth(_) => "Login failed. Please check your name and email and try again.".to_string(),
                other => other.to_string(),
            };
            html(render::entry_page(None, Some(&message)))
        }
    }
}

async fn logout(state: web::Data<AppState>) -> impl Responder {
    redirect(state.auth.logout().await)
}

/// GET /search?breed={term}
///
/// The first visit loads the breed catalog and the first page.
async fn search(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    if let Some(response) = guard(&state, Route::Search) {
        return Ok(response);
    }

    if state.search.view().await.status == SearchStatus::Idle {
        // other failures land on the banner; searching works without the breed catalog
        if let Err(AppError::Unauthorized) = state.search.load_breeds().await {
            return Err(AppError::Unauthorized);
        }
        if let Err(AppError::Unauthorized) = state.search.refresh().await {
            return Err(AppError::Unauthorized);
        }
    }

    let term = query.get("breed").map(String::as_str).unwrap_or("");
    let breeds = state.search.breeds_matching(term).await;
    let view = state.search.view().await;
    let favorites = state.favorites.snapshot().await;

    Ok(html(render::search_page(
        state.auth.session().as_ref(),
        &view,
        &favorites,
        term,
        &breeds,
    )))
}

/// POST /search/filters
async fn apply_filters(
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    if let Some(response) = guard(&state, Route::Search) {
        return Ok(response);
    }

    let current_sort = state.search.filters().await.sort();
    let result = match FilterState::from_pairs(&form, current_sort) {
        Ok(filters) => state.search.apply_filters(filters).await,
        Err(e) => Err(e),
    };

    match result {
        Err(AppError::Unauthorized) => Err(AppError::Unauthorized),
        Err(e @ AppError::InvalidFilter(_)) => {
            tracing::info!("Rejected filters: {}", e);
            state.search.set_notice(e.to_string()).await;
            Ok(redirect(Route::Search))
        }
        // request failures are already on the view-model's banner
        _ => Ok(redirect(Route::Search)),
    }
}

/// POST /search/page/{next|prev}
async fn change_page(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    if let Some(response) = guard(&state, Route::Search) {
        return Ok(response);
    }

    let direction: PageDirection = path.into_inner().parse()?;
    // NoSuchPage and request failures are reported on the banner
    if let Err(AppError::Unauthorized) = state.search.go_to_page(direction).await {
        return Err(AppError::Unauthorized);
    }
    Ok(redirect(Route::Search))
}

async fn dismiss_notice(state: web::Data<AppState>) -> HttpResponse {
    if let Some(response) = guard(&state, Route::Search) {
        return response;
    }

    state.search.dismiss_notice().await;
    redirect(Route::Search)
}

/// POST /favorites/{id}
async fn toggle_favorite(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    if let Some(response) = guard(&state, Route::Search) {
        return Ok(response);
    }

    state.favorites.toggle(&path.into_inner()).await?;
    Ok(redirect(Route::Search))
}

/// GET /match
///
/// Runs the match flow on every visit; the result is never cached.
async fn find_match(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if let Some(response) = guard(&state, Route::Match) {
        return Ok(response);
    }

    let favorites = state.favorites.snapshot().await;
    let session = state.auth.session();

    let page = match state.matcher.request_match(&favorites).await {
        Ok(dog) => render::match_page(session.as_ref(), Ok(&dog)),
        Err(AppError::Unauthorized) => return Err(AppError::Unauthorized),
        Err(AppError::NoFavorites) => {
            render::match_page(session.as_ref(), Err("No favorited dogs found"))
        }
        Err(_) => render::match_page(session.as_ref(), Err(MATCH_FAILED)),
    };

    Ok(html(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, SortSpec};
    use crate::services::{AdoptionClient, MemoryStorage, SessionStore, Storage};
    use actix_web::{http::StatusCode, test, App};
    use std::time::Duration;

    fn app_state(storage: Arc<dyn Storage>) -> AppState {
        let client = Arc::new(AdoptionClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap());
        let auth = Arc::new(AuthController::new(client.clone(), SessionStore::new(storage.clone())));
        AppState {
            search: Arc::new(SearchViewModel::new(client.clone(), auth.clone(), 20, SortSpec::default())),
            favorites: Arc::new(FavoritesTracker::load(storage)),
            matcher: Arc::new(MatchViewModel::new(client, auth.clone())),
            auth,
        }
    }

    #[actix_web::test]
    async fn test_protected_routes_redirect_without_session() {
        let state = app_state(Arc::new(MemoryStorage::new()));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

        for path in ["/search", "/match"] {
            let req = test::TestRequest::get().uri(path).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", path);
            assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
        }

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_match_with_no_favorites_renders_inline() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone())
            .save(&Session::new("Ada", "ada@example.com"))
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(storage)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/match").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("No favorited dogs found"));
        assert!(body.contains("Hello, Ada"));
    }

    #[actix_web::test]
    async fn test_dismiss_requires_session() {
        let state = app_state(Arc::new(MemoryStorage::new()));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

        let req = test::TestRequest::post().uri("/search/notice/dismiss").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn test_blank_name_is_rejected_inline() {
        let state = app_state(Arc::new(MemoryStorage::new()));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("name", "   "), ("email", "ada@example.com")])
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Please enter your name"));
    }

    #[actix_web::test]
    async fn test_invalid_login_form_is_rejected_inline() {
        let state = app_state(Arc::new(MemoryStorage::new()));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("name", "Ada"), ("email", "nope")])
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Please enter a valid email address"));
    }
}
