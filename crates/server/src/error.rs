use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use breedmatch_common::BreedMatchError;

use crate::types::ErrorResponse;

/// HTTP face of [`BreedMatchError`] for the JSON API
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub BreedMatchError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.0.to_string(),
        })
    }
}
