use actix_web::{web, HttpResponse};

use super::PredictionHandlerState;

/// Liveness probe
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Readiness probe. The model is loaded before the listener binds, so a
/// registered scorer means the service can take traffic.
pub async fn ready(state: Option<web::Data<PredictionHandlerState>>) -> HttpResponse {
    match state {
        Some(_) => HttpResponse::Ok().body("OK"),
        None => HttpResponse::ServiceUnavailable().body("model not loaded"),
    }
}
