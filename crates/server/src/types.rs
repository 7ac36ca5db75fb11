use breedmatch_common::{Trait, TraitScores};
use breedmatch_vector::{BreedRecord, Recommendation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/recommend` and `POST /api/recommend/knn`
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// The ten trait preferences, at the top level of the object
    #[serde(flatten)]
    pub preferences: TraitScores,

    /// Number of breeds wanted
    #[serde(default)]
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Recommendation>,
    pub count: usize,

    /// k-means cluster of the standardized preferences
    pub user_cluster: Option<usize>,
}

/// A k-NN neighbour of the user's preferences
#[derive(Debug, Serialize)]
pub struct KnnRecommendation {
    pub breed: String,

    /// 1 / (1 + distance)
    pub similarity: f64,

    /// Euclidean distance in standardized space
    pub distance: f64,

    /// Raw trait scores, absent when the model knows a breed the dataset lacks
    pub characteristics: Option<TraitScores>,
}

#[derive(Debug, Serialize)]
pub struct KnnResponse {
    pub recommendations: Vec<KnnRecommendation>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BreedsResponse<'a> {
    pub breeds: &'a [BreedRecord],
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub breeds: usize,
    pub models_trained_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A trait as shown on the form and in tables
#[derive(Debug, Serialize)]
pub struct FeatureView {
    pub name: &'static str,
    pub label: String,
    pub description: &'static str,
}

impl FeatureView {
    pub fn all() -> Vec<Self> {
        Trait::ALL
            .iter()
            .map(|&t| Self {
                name: t.name(),
                label: t.label(),
                description: t.description(),
            })
            .collect()
    }
}

/// One labelled score
#[derive(Debug, Serialize)]
pub struct TraitValue {
    pub name: &'static str,
    pub label: String,
    pub value: u8,
}

pub fn trait_values(scores: &TraitScores) -> Vec<TraitValue> {
    scores
        .iter()
        .map(|(t, value)| TraitValue {
            name: t.name(),
            label: t.label(),
            value,
        })
        .collect()
}

/// A recommendation as shown on the results page
#[derive(Debug, Serialize)]
pub struct RecommendationView {
    pub rank: usize,
    pub breed: String,
    pub similarity_percent: f64,
    pub characteristics: Vec<TraitValue>,
}

impl RecommendationView {
    pub fn from_ranked(recommendations: &[Recommendation]) -> Vec<Self> {
        recommendations
            .iter()
            .enumerate()
            .map(|(i, r)| Self {
                rank: i + 1,
                breed: r.breed.clone(),
                similarity_percent: r.similarity_percent(),
                characteristics: trait_values(&r.characteristics),
            })
            .collect()
    }
}
