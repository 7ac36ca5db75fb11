use actix_web::{get, web, HttpResponse};
use minijinja::context;
use std::sync::Arc;

use crate::error::ApiError;
use crate::routes::render_page;
use crate::state::AppState;

/// Statistics table and charts
#[get("/analytics")]
pub async fn analytics_page(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    render_page(
        &state,
        "analytics.html",
        context! {
            stats => &state.statistics,
            charts => &state.charts,
        },
    )
}

#[get("/analytics/stats")]
pub async fn stats(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(&state.statistics)
}
