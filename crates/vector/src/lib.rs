//! BreedMatch Similarity Search
//!
//! Breed dataset, feature standardization and cosine-similarity ranking

mod dataset;
mod engine;
mod scaler;
mod similarity;
mod types;

pub use dataset::{BreedRecord, Dataset};
pub use engine::SimilarityRanker;
pub use scaler::{StandardScaler, MIN_STD};
pub use similarity::{cosine_similarity, euclidean_distance, l2_norm};
pub use types::Recommendation;
