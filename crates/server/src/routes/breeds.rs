use actix_web::{get, web, HttpResponse};
use minijinja::context;
use std::sync::Arc;

use crate::error::ApiError;
use crate::routes::render_page;
use crate::state::AppState;
use crate::types::{BreedsResponse, FeatureView};

/// Table of every breed
#[get("/breeds")]
pub async fn breeds_page(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    render_page(
        &state,
        "dog_breeds.html",
        context! {
            breeds => state.dataset.records(),
            features => FeatureView::all(),
        },
    )
}

#[get("/breeds")]
pub async fn list_breeds(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let breeds = state.dataset.records();
    HttpResponse::Ok().json(BreedsResponse {
        breeds,
        count: breeds.len(),
    })
}
