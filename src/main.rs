use actix_web::{middleware, web, App, HttpServer};
use pawmatch::config::Settings;
use pawmatch::core::{AuthController, FavoritesTracker, MatchViewModel, SearchViewModel};
use pawmatch::routes::{self, AppState};
use pawmatch::services::{AdoptionClient, FileStorage, SessionStore, Storage};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging, RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.logging.format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.compact().init(),
    }

    info!("Starting Pawmatch...");
    info!("Adoption service: {}", settings.service.base_url);

    let client = match AdoptionClient::new(settings.service.base_url.clone(), settings.timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let storage = FileStorage::open(&settings.storage.path);
    info!("Using storage file {}", storage.path().display());
    let storage: Arc<dyn Storage> = Arc::new(storage);

    let auth = Arc::new(AuthController::new(client.clone(), SessionStore::new(storage.clone())));

    let search = Arc::new(SearchViewModel::new(
        client.clone(),
        auth.clone(),
        settings.search.page_size,
        settings.search.sort(),
    ));

    info!(
        "Search initialized (page size: {}, sort: {})",
        settings.search.page_size,
        settings.search.sort()
    );

    let app_state = AppState {
        favorites: Arc::new(FavoritesTracker::load(storage)),
        matcher: Arc::new(MatchViewModel::new(client, auth.clone())),
        search,
        auth,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(2);

    info!("Starting HTTP server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::FormConfig::default().error_handler(routes::handle_form_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
