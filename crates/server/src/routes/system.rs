use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Liveness probe; the state only exists once every artifact loaded
#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        breeds: state.dataset.len(),
        models_trained_at: state.models.info.trained_at,
        timestamp: Utc::now(),
    })
}
