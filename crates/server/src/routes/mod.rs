//! HTTP routes
//!
//! HTML pages live under `/dogs`, the JSON API under `/api`.

pub mod analytics;
pub mod breeds;
pub mod pages;
pub mod recommend;
pub mod system;

use actix_web::error::{InternalError, JsonPayloadError, UrlencodedError};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use breedmatch_common::BreedMatchError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::ErrorResponse;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::landing)
        .service(system::health)
        .service(
            web::scope("/dogs")
                .app_data(web::FormConfig::default().error_handler(form_error))
                .service(pages::home)
                .service(pages::home_alias)
                .service(pages::form)
                .service(recommend::recommend_page)
                .service(breeds::breeds_page)
                .service(analytics::analytics_page),
        )
        .service(
            web::scope("/api")
                .app_data(web::JsonConfig::default().error_handler(json_error))
                .service(recommend::recommend)
                .service(recommend::recommend_knn)
                .service(breeds::list_breeds)
                .service(analytics::stats),
        );
}

/// Render a page into a `200 OK` HTML response
pub(crate) fn render_page<S: Serialize>(state: &AppState, name: &str, ctx: S) -> Result<HttpResponse, ApiError> {
    let body = state.templates.render(name, ctx).map_err(|e| {
        error!("Failed to render {}: {}", name, e);
        e
    })?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(body))
}

/// HTML error page, falling back to plain text if the template fails
pub(crate) fn error_page(state: Option<&AppState>, status: StatusCode, message: &str) -> HttpResponse {
    let body = state
        .and_then(|s| s.templates.render_error(status.as_u16(), message).ok())
        .unwrap_or_else(|| message.to_string());
    HttpResponse::build(status).content_type(ContentType::html()).body(body)
}

fn form_error(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid form submission: {}", err);
    warn!("{}", message);
    let state = req.app_data::<web::Data<Arc<AppState>>>();
    let response = error_page(state.map(|s| &**s.get_ref()), StatusCode::BAD_REQUEST, &message);
    InternalError::from_response(err, response).into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = BreedMatchError::invalid_input(err.to_string()).to_string();
    warn!("{}", message);
    let response = HttpResponse::BadRequest().json(ErrorResponse { error: message });
    InternalError::from_response(err, response).into()
}
