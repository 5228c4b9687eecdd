use actix_web::HttpResponse;

use crate::adapters::http::dtos::HealthResponse;

/// Liveness check
/// GET /health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(HealthResponse {
    status: "ok".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
  })
}
