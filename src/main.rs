use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use animal_rescue::config::{Settings, StorageBackend};
use animal_rescue::core::AnimalClassifier;
use animal_rescue::routes::{self, AppState};
use animal_rescue::services::{
    CacheManager, DisabledGeocoder, Geocoder, InMemoryStore, NominatimGeocoder, PostgresStore,
    RescueStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST);
        HttpResponse::build(status).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path segment errors (e.g. malformed ids)
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn RescueStore>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let store = PostgresStore::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Ok(Arc::new(store))
        }
    }
}

async fn build_cache(settings: &Settings) -> Arc<CacheManager> {
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let Some(redis_url) = settings.cache.redis_url.as_deref() else {
        info!("Geocode cache: L1 only ({} entries, TTL: {}s)", l1_cache_size, cache_ttl);
        return Arc::new(CacheManager::in_memory(l1_cache_size, cache_ttl));
    };

    match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
        Ok(cache) => {
            info!("Geocode cache: L1 {} entries + Redis, TTL: {}s", l1_cache_size, cache_ttl);
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), falling back to L1 only", e);
            Arc::new(CacheManager::in_memory(l1_cache_size, cache_ttl))
        }
    }
}

async fn build_geocoder(settings: &Settings) -> std::io::Result<Arc<dyn Geocoder>> {
    let geocoding = &settings.geocoding;
    if !geocoding.enabled {
        warn!("Geocoding disabled; new records will have no location");
        return Ok(Arc::new(DisabledGeocoder));
    }

    let geocoder = NominatimGeocoder::new(
        &geocoding.base_url,
        &geocoding.user_agent,
        Duration::from_secs(geocoding.timeout_secs),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?
    .with_cache(build_cache(settings).await);

    info!("Geocoding via {}", geocoding.base_url);
    Ok(Arc::new(geocoder))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging; environment wins over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format =
        std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting animal rescue service...");

    let store = build_store(&settings).await?;
    let geocoder = build_geocoder(&settings).await?;
    let classifier = AnimalClassifier::new(settings.classifier);

    let app_state = AppState::new(
        store,
        geocoder,
        classifier,
        settings.notifications.radius_km,
        settings.notifications.excerpt_chars,
    );

    info!(
        "Notifying shelters within {}km of new reports",
        settings.notifications.radius_km
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(10 * 1024 * 1024)
                    .error_handler(handle_json_payload_error),
            )
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .app_data(web::PayloadConfig::default().limit(10 * 1024 * 1024))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
