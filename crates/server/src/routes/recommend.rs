use actix_web::http::StatusCode;
use actix_web::{post, web, HttpResponse};
use breedmatch_common::{BreedMatchError, TraitScores};
use breedmatch_vector::Recommendation;
use minijinja::context;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::charts::comparison_chart;
use crate::error::ApiError;
use crate::routes::{error_page, render_page};
use crate::state::AppState;
use crate::types::{
    trait_values, KnnRecommendation, KnnResponse, RecommendRequest, RecommendResponse, RecommendationView,
};

/// Rank breeds, logging and swallowing ranker failures
fn rank(state: &AppState, preferences: &TraitScores, top_n: usize) -> Vec<Recommendation> {
    match state.ranker.find_similar_breeds(preferences, top_n) {
        Ok(recommendations) => recommendations,
        Err(e) => {
            error!("Similarity ranking failed: {}", e);
            Vec::new()
        }
    }
}

/// Requested count, defaulted and capped by configuration
fn resolve_top_n(state: &AppState, requested: Option<usize>) -> Result<usize, BreedMatchError> {
    if requested == Some(0) {
        return Err(BreedMatchError::invalid_input("top_n must be at least 1"));
    }
    Ok(state.config.resolve_top_n(requested))
}

/// Form submission from the preference page
#[post("/recommend")]
pub async fn recommend_page(
    form: web::Form<TraitScores>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let preferences = form.into_inner();
    if let Err(e) = preferences.validate() {
        warn!("Rejected preferences: {}", e);
        return Ok(error_page(Some(&**state), StatusCode::BAD_REQUEST, &e.to_string()));
    }

    let recommendations = rank(&state, &preferences, state.config.default_top_n);
    info!(
        "Form recommendation: {} results, best match {:?}",
        recommendations.len(),
        recommendations.first().map(|r| r.breed.as_str())
    );

    render_page(
        &state,
        "dog_results.html",
        context! {
            recommendations => RecommendationView::from_ranked(&recommendations),
            user_preferences => trait_values(&preferences),
            comparison_chart => comparison_chart(&preferences, recommendations.first()),
        },
    )
}

/// Cosine-similarity recommendations as JSON
#[post("/recommend")]
pub async fn recommend(
    req: web::Json<RecommendRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    req.preferences.validate()?;
    let top_n = resolve_top_n(&state, req.top_n)?;

    let recommendations = rank(&state, &req.preferences, top_n);
    let user_cluster = state.user_cluster(&req.preferences);

    Ok(HttpResponse::Ok().json(RecommendResponse {
        count: recommendations.len(),
        recommendations,
        user_cluster,
    }))
}

/// Nearest neighbours from the k-NN model as JSON
#[post("/recommend/knn")]
pub async fn recommend_knn(
    req: web::Json<RecommendRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    req.preferences.validate()?;
    let top_n = resolve_top_n(&state, req.top_n)?;

    let neighbors = state
        .ranker
        .standardize(&req.preferences)
        .and_then(|scaled| state.models.knn.kneighbors(&scaled, top_n))
        .unwrap_or_else(|e| {
            error!("k-NN lookup failed: {}", e);
            Vec::new()
        });

    let recommendations: Vec<KnnRecommendation> = neighbors
        .into_iter()
        .map(|n| KnnRecommendation {
            similarity: n.similarity(),
            distance: n.distance,
            characteristics: state.dataset.get(&n.label).map(|r| r.traits),
            breed: n.label,
        })
        .collect();

    Ok(HttpResponse::Ok().json(KnnResponse {
        count: recommendations.len(),
        recommendations,
    }))
}
