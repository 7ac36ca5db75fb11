use breedmatch_common::TraitScores;
use serde::{Deserialize, Serialize};

/// A ranked breed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Breed name
    pub breed: String,

    /// Cosine similarity in [-1.0, 1.0]
    pub similarity: f64,

    /// Raw (unscaled) trait scores of the breed
    pub characteristics: TraitScores,
}

impl Recommendation {
    pub fn new(breed: impl Into<String>, similarity: f64, characteristics: TraitScores) -> Self {
        Self {
            breed: breed.into(),
            similarity,
            characteristics,
        }
    }

    /// Similarity as a rounded percentage for display
    pub fn similarity_percent(&self) -> f64 {
        (self.similarity * 1000.0).round() / 10.0
    }
}
