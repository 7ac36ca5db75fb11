use breedmatch_common::schema::{check_features, feature_names};
use breedmatch_common::{BreedMatchError, Result, Trait, FEATURE_COUNT, SCHEMA_VERSION};
use breedmatch_vector::StandardScaler;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::forest::RandomForest;
use crate::kmeans::KMeans;
use crate::knn::KnnClassifier;

pub const SCALER_FILE: &str = "scaler.json";
pub const KNN_FILE: &str = "knn.json";
pub const KMEANS_FILE: &str = "kmeans.json";
pub const FOREST_FILE: &str = "forest.json";
pub const INFO_FILE: &str = "breed_info.json";

/// Held-out accuracy of the classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub random_forest_accuracy: f64,
    pub knn_accuracy: f64,
}

/// Metadata document of the bundle (`breed_info.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedInfo {
    pub schema_version: u32,
    pub breeds: Vec<String>,
    pub features: Vec<String>,
    pub feature_descriptions: BTreeMap<String, String>,
    /// Fingerprint of the dataset the models were fitted on
    pub dataset_sha256: String,
    pub trained_at: DateTime<Utc>,
    pub metrics: TrainingMetrics,
}

impl BreedInfo {
    pub fn new(breeds: Vec<String>, dataset_sha256: String, metrics: TrainingMetrics) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            breeds,
            features: feature_names(),
            feature_descriptions: Trait::ALL
                .iter()
                .map(|t| (t.name().to_string(), t.description().to_string()))
                .collect(),
            dataset_sha256,
            trained_at: Utc::now(),
            metrics,
        }
    }

    /// Reject metadata written for a different feature schema
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(BreedMatchError::config(format!(
                "Model bundle schema version {} does not match {}",
                self.schema_version, SCHEMA_VERSION
            )));
        }
        check_features(&self.features)
    }
}

/// Everything the trainer produces
///
/// The forest is only needed for evaluation, so [`ModelBundle::load`]
/// leaves it out; use [`ModelBundle::load_forest`] to read it.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub scaler: StandardScaler,
    pub knn: KnnClassifier,
    pub kmeans: KMeans,
    pub forest: Option<RandomForest>,
    pub info: BreedInfo,
}

impl ModelBundle {
    /// Write every artifact into `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| {
            BreedMatchError::file_system(format!(
                "Failed to create model directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        write_json(&dir.join(SCALER_FILE), &self.scaler)?;
        write_json(&dir.join(KNN_FILE), &self.knn)?;
        write_json(&dir.join(KMEANS_FILE), &self.kmeans)?;
        if let Some(forest) = &self.forest {
            write_json(&dir.join(FOREST_FILE), forest)?;
        }
        write_json(&dir.join(INFO_FILE), &self.info)?;

        info!("Model bundle saved to {}", dir.display());
        Ok(())
    }

    /// Read the serving artifacts from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let info: BreedInfo = read_json(&dir.join(INFO_FILE))?;
        info.validate()?;

        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        if scaler.n_features() != FEATURE_COUNT {
            return Err(BreedMatchError::config(format!(
                "Scaler in {} has {} features, expected {}",
                dir.display(),
                scaler.n_features(),
                FEATURE_COUNT
            )));
        }

        let knn: KnnClassifier = read_json(&dir.join(KNN_FILE))?;
        let kmeans: KMeans = read_json(&dir.join(KMEANS_FILE))?;
        if !kmeans.is_fitted() {
            return Err(BreedMatchError::config("KMeans model in bundle is not fitted"));
        }

        info!(
            "Model bundle loaded from {} ({} breeds, trained {})",
            dir.display(),
            info.breeds.len(),
            info.trained_at
        );

        Ok(Self {
            scaler,
            knn,
            kmeans,
            forest: None,
            info,
        })
    }

    /// Read the persisted random forest
    pub fn load_forest(dir: &Path) -> Result<RandomForest> {
        read_json(&dir.join(FOREST_FILE))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value)?;
    std::fs::write(path, data)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(BreedMatchError::not_found(format!(
            "Model artifact {}",
            path.display()
        )));
    }
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| {
        BreedMatchError::Serialization(format!("{}: {}", path.display(), e))
    })
}
