use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use pet_match::config::{Settings, StoreBackend};
use pet_match::core::Matcher;
use pet_match::routes::{self, reports::AppState};
use pet_match::services::{
    MemoryReportStore, PostgresReportStore, Registry, ReportStore, SupabaseReportStore,
};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

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
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Build the report store selected by `store.backend`
async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn ReportStore>> {
    let store: Arc<dyn ReportStore> = match settings.store.backend {
        StoreBackend::Supabase => {
            let store = SupabaseReportStore::new(
                settings.store.url.clone(),
                settings.store.api_key.clone(),
                settings.store.table.clone(),
                settings.store.timeout_secs,
            )
            .map_err(std::io::Error::other)?;
            info!("Hosted report store client initialized ({})", settings.store.url);
            Arc::new(store)
        }
        StoreBackend::Postgres => {
            let database = settings.database.as_ref().ok_or_else(|| {
                std::io::Error::other("store.backend = \"postgres\" requires a [database] section")
            })?;
            let store = PostgresReportStore::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::other(e)
            })?;
            info!("PostgreSQL report store initialized");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Using in-memory report store");
            Arc::new(MemoryReportStore::new())
        }
    };

    Ok(store)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; PETMATCH_CONFIG points at an explicit file
    let loaded = match std::env::var("PETMATCH_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    };
    let settings = loaded.map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting pet registry matching service...");
    info!("Configuration loaded successfully");

    let store = build_store(&settings).await?;

    let matcher = Matcher::new(settings.matching.match_threshold);
    let registry = Registry::new(store, matcher)
        .with_match_radius_enforced(settings.matching.enforce_match_radius);

    info!(
        "Registry initialized (match threshold: {}, match radius enforced: {})",
        matcher.threshold(),
        settings.matching.enforce_match_radius
    );

    let app_state = AppState {
        registry,
        matching: settings.matching.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
