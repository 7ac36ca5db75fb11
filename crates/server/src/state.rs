use breedmatch_common::{AppConfig, Result, TraitScores};
use breedmatch_ml::ModelBundle;
use breedmatch_vector::{Dataset, SimilarityRanker};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analytics::{dataset_statistics, DatasetStatistics};
use crate::charts::AnalyticsCharts;
use crate::templates::Templates;

/// Shared application state
///
/// Built once at startup and only read afterwards, so handlers share it
/// through an `Arc` without locking.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Breed catalogue
    pub dataset: Arc<Dataset>,

    /// Cosine-similarity ranker over the catalogue
    pub ranker: SimilarityRanker,

    /// Trained scaler, k-NN and k-means
    pub models: ModelBundle,

    pub templates: Templates,

    /// Precomputed analytics
    pub statistics: DatasetStatistics,
    pub charts: AnalyticsCharts,
}

impl AppState {
    /// Load dataset and model bundle from the configured paths
    ///
    /// Any missing or inconsistent artifact is an error; the server must not
    /// start half initialized.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let dataset = Dataset::load_csv(&config.dataset_path)?;
        info!("Dataset loaded: {} breeds from {}", dataset.len(), config.dataset_path.display());

        let models = ModelBundle::load(&config.models_dir)?;

        Self::from_parts(config, dataset, models)
    }

    /// Assemble state from an already loaded dataset and bundle
    pub fn from_parts(config: AppConfig, dataset: Dataset, models: ModelBundle) -> Result<Self> {
        models.info.validate()?;

        let fingerprint = dataset.fingerprint()?;
        if fingerprint != models.info.dataset_sha256 {
            warn!(
                "Dataset fingerprint {} differs from the one the models were trained on ({}); retrain to refresh the bundle",
                fingerprint, models.info.dataset_sha256
            );
        }

        let dataset = Arc::new(dataset);
        let ranker = SimilarityRanker::new(Arc::clone(&dataset), models.scaler.clone())?;
        let templates = Templates::new()?;
        let statistics = dataset_statistics(&dataset);
        let charts = AnalyticsCharts::build(&dataset);

        info!(
            "Application state ready - {} breeds, {} clusters, k-NN over {} breeds",
            dataset.len(),
            models.kmeans.n_clusters(),
            models.knn.n_samples()
        );

        Ok(Self {
            config,
            dataset,
            ranker,
            models,
            templates,
            statistics,
            charts,
        })
    }

    /// k-means cluster of the user's standardized preferences
    pub fn user_cluster(&self, preferences: &TraitScores) -> Option<usize> {
        let scaled = match self.ranker.standardize(preferences) {
            Ok(scaled) => scaled,
            Err(e) => {
                warn!("Could not standardize preferences: {}", e);
                return None;
            }
        };
        match self.models.kmeans.predict_one(&scaled) {
            Ok(cluster) => Some(cluster),
            Err(e) => {
                warn!("Cluster assignment failed: {}", e);
                None
            }
        }
    }
}
