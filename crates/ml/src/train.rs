use breedmatch_common::Result;
use breedmatch_vector::{Dataset, StandardScaler};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Axis;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::bundle::{BreedInfo, ModelBundle, TrainingMetrics};
use crate::forest::RandomForest;
use crate::kmeans::KMeans;
use crate::knn::KnnClassifier;
use crate::split::{accuracy, train_test_split};

/// Hyperparameters of the offline training run
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub n_clusters: usize,
    pub knn_neighbors: usize,
    pub n_estimators: usize,
    pub test_size: f64,
    pub seed: u64,
    /// Draw a progress bar while the forest is fitted
    pub show_progress: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            knn_neighbors: 3,
            n_estimators: 100,
            test_size: 0.3,
            seed: 42,
            show_progress: true,
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub n_breeds: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub metrics: TrainingMetrics,
    pub kmeans_inertia: f64,
    /// Number of breeds per cluster
    pub cluster_sizes: Vec<usize>,
}

/// Fit scaler, k-means, random forest and k-NN over a dataset
///
/// The classifiers are evaluated on a held-out split. The persisted k-NN
/// index is then refit on every breed so recommendations can reach all of
/// them.
pub fn train(dataset: &Dataset, options: &TrainingOptions) -> Result<(ModelBundle, TrainingReport)> {
    info!("Training on {} breeds", dataset.len());

    let x = dataset.matrix();
    let labels = dataset.breed_names();

    let scaler = StandardScaler::fit(&x)?;
    let x_scaled = scaler.transform(&x)?;
    info!("Scaler fitted over {} features", scaler.n_features());

    let mut kmeans = KMeans::new(options.n_clusters).with_seed(options.seed);
    kmeans.fit(&x_scaled)?;
    let assignments = kmeans.predict(&x_scaled)?;
    let mut cluster_sizes = vec![0usize; options.n_clusters];
    for cluster in assignments {
        cluster_sizes[cluster] += 1;
    }
    info!("KMeans fitted: {} clusters, sizes {:?}", options.n_clusters, cluster_sizes);

    let (train_idx, test_idx) = train_test_split(dataset.len(), options.test_size, options.seed)?;
    let x_train = x_scaled.select(Axis(0), &train_idx);
    let x_test = x_scaled.select(Axis(0), &test_idx);
    let y_train: Vec<String> = train_idx.iter().map(|&i| labels[i].clone()).collect();
    let y_test: Vec<String> = test_idx.iter().map(|&i| labels[i].clone()).collect();

    let progress = if options.show_progress {
        let pb = ProgressBar::new(options.n_estimators as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trees")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut forest = RandomForest::new(options.n_estimators).with_seed(options.seed);
    forest.fit(&x_train, &y_train, &progress)?;
    progress.finish_and_clear();
    let forest_accuracy = accuracy(&y_test, &forest.predict(&x_test)?);
    info!("Random forest accuracy: {:.4}", forest_accuracy);

    let mut knn_eval = KnnClassifier::new(options.knn_neighbors);
    knn_eval.fit(&x_train, &y_train)?;
    let knn_accuracy = accuracy(&y_test, &knn_eval.predict(&x_test)?);
    info!("k-NN accuracy: {:.4}", knn_accuracy);

    let mut knn = KnnClassifier::new(options.knn_neighbors);
    knn.fit(&x_scaled, &labels)?;

    let metrics = TrainingMetrics {
        random_forest_accuracy: forest_accuracy,
        knn_accuracy,
    };
    let info = BreedInfo::new(labels, dataset.fingerprint()?, metrics.clone());

    let report = TrainingReport {
        n_breeds: dataset.len(),
        n_train: train_idx.len(),
        n_test: test_idx.len(),
        metrics,
        kmeans_inertia: kmeans.inertia(),
        cluster_sizes,
    };

    let bundle = ModelBundle {
        scaler,
        knn,
        kmeans,
        forest: Some(forest),
        info,
    };

    Ok((bundle, report))
}

/// Load a dataset file, train, and write the bundle into `models_dir`
pub fn train_and_save(dataset_path: &Path, models_dir: &Path, options: &TrainingOptions) -> Result<TrainingReport> {
    let dataset = Dataset::load_csv(dataset_path)?;
    let (bundle, report) = train(&dataset, options)?;
    bundle.save(models_dir)?;
    Ok(report)
}
