//! BreedMatch offline models
//!
//! Clustering and classification models, the model artifact bundle, the
//! training pipeline and dataset preparation

mod adapt;
mod bundle;
mod forest;
mod kmeans;
mod knn;
mod seed;
mod split;
mod train;

pub use adapt::{adapt_kaggle, adapt_kaggle_file, estimate_size, AdaptReport};
pub use bundle::{BreedInfo, ModelBundle, TrainingMetrics};
pub use forest::{DecisionTree, RandomForest};
pub use kmeans::KMeans;
pub use knn::{KnnClassifier, Neighbor};
pub use seed::seed_dataset;
pub use split::{accuracy, train_test_split};
pub use train::{train, train_and_save, TrainingOptions, TrainingReport};
