use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::config::MatchingSettings;
use crate::models::{
    CreateReportRequest, ErrorResponse, HealthResponse, MatchesQuery, NearbyQuery, ReportUpdate,
    ReportsResponse,
};
use crate::services::{Registry, RegistryError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub matching: MatchingSettings,
}

/// Configure all report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/reports", web::post().to(create_report))
        .route("/reports/nearby", web::get().to(find_nearby))
        .route("/reports/{id}", web::get().to(get_report))
        .route("/reports/{id}", web::patch().to(update_report))
        .route("/reports/{id}/archive", web::post().to(archive_report))
        .route("/users/{owner_id}/reports", web::get().to(list_owner_reports))
        .route("/users/{owner_id}/matches", web::get().to(find_matches));
}

fn error_body(status: u16, error: &str, message: String) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    }
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(error_body(400, "Validation failed", message))
}

fn not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(error_body(404, "Not found", format!("Report {} does not exist", id)))
}

/// Map a registry failure onto an HTTP response
fn registry_error(err: RegistryError) -> HttpResponse {
    match err {
        RegistryError::InvalidReport(message) => validation_failed(message),
        RegistryError::InvalidTransition { .. } => {
            HttpResponse::Conflict().json(error_body(409, "Invalid state transition", err.to_string()))
        }
        RegistryError::Retrieval(_) => {
            tracing::error!("Report store failure: {}", err);
            HttpResponse::BadGateway().json(error_body(502, "Report store unavailable", err.to_string()))
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.registry.store().health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Nearby reports endpoint
///
/// GET /api/v1/reports/nearby?latitude=-23.55&longitude=-46.60&radiusKm=5
async fn find_nearby(
    state: web::Data<AppState>,
    query: web::Query<NearbyQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors.to_string());
    }

    let radius_km = query.radius_km.unwrap_or(state.matching.nearby_radius_km);

    match state
        .registry
        .get_nearby(query.latitude, query.longitude, radius_km)
        .await
    {
        Ok(reports) => {
            tracing::info!(
                "Returning {} reports within {}km of ({}, {})",
                reports.len(),
                radius_km,
                query.latitude,
                query.longitude
            );
            HttpResponse::Ok().json(ReportsResponse::from(reports))
        }
        Err(e) => registry_error(e),
    }
}

/// Probable matches endpoint
///
/// GET /api/v1/users/{owner_id}/matches?radiusKm=10
async fn find_matches(
    state: web::Data<AppState>,
    owner_id: web::Path<String>,
    query: web::Query<MatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors.to_string());
    }

    let radius_km = query.radius_km.unwrap_or(state.matching.match_radius_km);

    match state.registry.get_matches(&owner_id, radius_km).await {
        Ok(reports) => HttpResponse::Ok().json(ReportsResponse::from(reports)),
        Err(e) => registry_error(e),
    }
}

async fn list_owner_reports(
    state: web::Data<AppState>,
    owner_id: web::Path<String>,
) -> impl Responder {
    match state.registry.list_owner_reports(&owner_id).await {
        Ok(reports) => HttpResponse::Ok().json(ReportsResponse::from(reports)),
        Err(e) => registry_error(e),
    }
}

/// Register a report
///
/// POST /api/v1/reports
///
/// Request body:
/// ```json
/// {
///   "ownerId": "string",
///   "estado": "PERDIDO|ENCONTRADO",
///   "especie": "CACHORRO|GATO|AVE|ROEDOR|REPTIL",
///   "tamanho": "PEQUENO|MEDIO|GRANDE",
///   "cor_pelagem": "string",
///   "latitude": -23.55,
///   "longitude": -46.60
/// }
/// ```
async fn create_report(
    state: web::Data<AppState>,
    req: web::Json<CreateReportRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_report request: {:?}", errors);
        return validation_failed(errors.to_string());
    }

    let (owner_id, report) = req.into_inner().into_parts();

    match state.registry.create_report(&owner_id, report).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => registry_error(e),
    }
}

async fn get_report(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    match state.registry.get_report(&id).await {
        Ok(Some(report)) => HttpResponse::Ok().json(report),
        Ok(None) => not_found(&id),
        Err(e) => registry_error(e),
    }
}

/// Update owner-editable fields, e.g. attaching `imagem_url` after upload
async fn update_report(
    state: web::Data<AppState>,
    id: web::Path<String>,
    req: web::Json<ReportUpdate>,
) -> impl Responder {
    match state.registry.update_report(&id, req.into_inner()).await {
        Ok(Some(report)) => HttpResponse::Ok().json(report),
        Ok(None) => not_found(&id),
        Err(e) => registry_error(e),
    }
}

async fn archive_report(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    match state.registry.archive_report(&id).await {
        Ok(Some(report)) => HttpResponse::Ok().json(report),
        Ok(None) => not_found(&id),
        Err(e) => registry_error(e),
    }
}
