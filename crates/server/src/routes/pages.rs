use actix_web::{get, web, HttpResponse};
use minijinja::context;
use std::sync::Arc;

use crate::error::ApiError;
use crate::routes::render_page;
use crate::state::AppState;
use crate::types::FeatureView;

/// Landing page
#[get("/")]
pub async fn landing(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    render_page(&state, "index.html", context! { total_breeds => state.dataset.len() })
}

fn render_home(state: &AppState) -> Result<HttpResponse, ApiError> {
    render_page(
        state,
        "dog_home.html",
        context! {
            total_breeds => state.dataset.len(),
            top_n => state.config.default_top_n,
        },
    )
}

/// Recommender home
#[get("/")]
pub async fn home(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    render_home(&state)
}

#[get("/home")]
pub async fn home_alias(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    render_home(&state)
}

/// Preference form, one 1-5 choice per trait
#[get("/form")]
pub async fn form(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    render_page(&state, "dog_form.html", context! { features => FeatureView::all() })
}
