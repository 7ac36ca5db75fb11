use breedmatch_common::{BreedMatchError, Result, TraitScores, FEATURE_COUNT};
use ndarray::{Array2, ArrayView1};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::scaler::StandardScaler;
use crate::similarity::cosine_similarity;
use crate::types::Recommendation;

/// Ranks breeds by cosine similarity to a standardized preference vector
///
/// Holds the dataset and the standardized dataset matrix; both are read-only
/// after construction so a ranker can be shared across request handlers.
pub struct SimilarityRanker {
    dataset: Arc<Dataset>,
    scaler: StandardScaler,
    scaled: Array2<f64>,
}

impl SimilarityRanker {
    /// Create a ranker over `dataset` using a fitted scaler
    pub fn new(dataset: Arc<Dataset>, scaler: StandardScaler) -> Result<Self> {
        if scaler.n_features() != FEATURE_COUNT {
            return Err(BreedMatchError::config(format!(
                "Scaler was fitted on {} features, dataset has {}",
                scaler.n_features(),
                FEATURE_COUNT
            )));
        }

        let scaled = scaler.transform(&dataset.matrix())?;

        info!("Similarity ranker initialized - {} breeds", dataset.len());

        Ok(Self {
            dataset,
            scaler,
            scaled,
        })
    }

    /// Top `top_n` breeds for a user's preferences
    pub fn find_similar_breeds(
        &self,
        preferences: &TraitScores,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        self.rank_vector(&preferences.to_f64_vec(), top_n)
    }

    /// Top `top_n` breeds for a raw trait vector in schema order
    ///
    /// Sorting is stable: breeds with equal similarity keep dataset order.
    pub fn rank_vector(&self, raw: &[f64], top_n: usize) -> Result<Vec<Recommendation>> {
        debug!("Ranking breeds for {:?} (top_n={})", raw, top_n);

        let user = self.scaler.transform_row(raw)?;
        let ranked = self.rank_scaled(user.view(), top_n);

        let results: Vec<Recommendation> = ranked
            .into_iter()
            .map(|(idx, score)| {
                let record = &self.dataset.records()[idx];
                Recommendation::new(record.breed.clone(), score, record.traits)
            })
            .collect();

        debug!(
            "Ranking completed - {} results from {} breeds",
            results.len(),
            self.dataset.len()
        );
        Ok(results)
    }

    /// (row index, similarity) pairs for an already standardized vector
    ///
    /// A zero vector has no direction; every breed then scores 0.0 and the
    /// first `top_n` breeds in dataset order are returned.
    pub fn rank_scaled(&self, user: ArrayView1<f64>, top_n: usize) -> Vec<(usize, f64)> {
        let mut scores: Vec<(usize, f64)> = self
            .scaled
            .rows()
            .into_iter()
            .enumerate()
            .map(|(idx, row)| (idx, cosine_similarity(user, row)))
            .collect();

        // sort_by is stable, ties keep their original order
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.truncate(top_n);
        scores
    }

    /// Standardized vector for a user's preferences
    pub fn standardize(&self, preferences: &TraitScores) -> Result<Vec<f64>> {
        Ok(self.scaler.transform_row(&preferences.to_f64_vec())?.to_vec())
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Standardized dataset matrix (N x 10)
    pub fn scaled_matrix(&self) -> &Array2<f64> {
        &self.scaled
    }
}
