//! k-nearest-neighbour classifier over euclidean distance

use breedmatch_common::{BreedMatchError, Result};
use breedmatch_vector::euclidean_distance;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A training row close to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    /// Row index in the fitted data
    pub index: usize,
    /// Label of that row
    pub label: String,
    /// Euclidean distance to the query
    pub distance: f64,
}

impl Neighbor {
    /// Distance mapped into (0, 1]: 1 / (1 + d)
    pub fn similarity(&self) -> f64 {
        1.0 / (1.0 + self.distance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    n_neighbors: usize,
    points: Option<Array2<f64>>,
    labels: Vec<String>,
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(3)
    }
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            points: None,
            labels: Vec::new(),
        }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Memorize training rows and their labels
    pub fn fit(&mut self, x: &Array2<f64>, labels: &[String]) -> Result<()> {
        if x.nrows() != labels.len() {
            return Err(BreedMatchError::model(format!(
                "{} rows but {} labels",
                x.nrows(),
                labels.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(BreedMatchError::model("Cannot fit k-NN with zero samples"));
        }
        if self.n_neighbors == 0 {
            return Err(BreedMatchError::model("n_neighbors must be at least 1"));
        }

        self.points = Some(x.clone());
        self.labels = labels.to_vec();
        Ok(())
    }

    /// The `k` closest training rows, nearest first
    ///
    /// Equal distances are ordered by row index.
    pub fn kneighbors(&self, query: &[f64], k: usize) -> Result<Vec<Neighbor>> {
        let points = self
            .points
            .as_ref()
            .ok_or_else(|| BreedMatchError::model("k-NN model is not fitted"))?;
        if query.len() != points.ncols() {
            return Err(BreedMatchError::invalid_input(format!(
                "Expected {} features, got {}",
                points.ncols(),
                query.len()
            )));
        }

        let query = ArrayView1::from(query);
        let mut distances: Vec<(usize, f64)> = points
            .rows()
            .into_iter()
            .map(|row| euclidean_distance(query, row))
            .enumerate()
            .collect();
        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        distances.truncate(k);

        Ok(distances
            .into_iter()
            .map(|(index, distance)| Neighbor {
                index,
                label: self.labels[index].clone(),
                distance,
            })
            .collect())
    }

    /// Majority label among the `n_neighbors` closest rows
    ///
    /// A tied vote goes to the tied label with the nearest member.
    pub fn predict_one(&self, query: &[f64]) -> Result<String> {
        let neighbors = self.kneighbors(query, self.n_neighbors)?;

        let mut votes: HashMap<&str, usize> = HashMap::new();
        for n in &neighbors {
            *votes.entry(n.label.as_str()).or_default() += 1;
        }
        let best = votes.values().copied().max().unwrap_or(0);

        neighbors
            .iter()
            .find(|n| votes.get(n.label.as_str()) == Some(&best))
            .map(|n| n.label.clone())
            .ok_or_else(|| BreedMatchError::model("k-NN vote produced no label"))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_one(&row.to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fitted() -> KnnClassifier {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [5.0, 5.0], [5.0, 6.0], [6.0, 5.0]];
        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &labels(&["a", "a", "a", "b", "b", "b"])).unwrap();
        knn
    }

    #[test]
    fn test_kneighbors_sorted() {
        let knn = fitted();
        let neighbors = knn.kneighbors(&[5.0, 5.0], 2).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].index, 3);
        assert_eq!(neighbors[0].distance, 0.0);
        assert_eq!(neighbors[0].similarity(), 1.0);
        // (5,6) and (6,5) are equally far; lower index first
        assert_eq!(neighbors[1].index, 4);
    }

    #[test]
    fn test_predict() {
        let knn = fitted();
        assert_eq!(knn.predict_one(&[0.2, 0.2]).unwrap(), "a");
        assert_eq!(knn.predict(&array![[5.5, 5.5], [0.0, 0.5]]).unwrap(), labels(&["b", "a"]));
    }

    #[test]
    fn test_tied_vote_prefers_nearest() {
        let x = array![[0.0], [1.0], [3.0], [4.0]];
        let mut knn = KnnClassifier::new(2);
        knn.fit(&x, &labels(&["near", "far", "x", "y"])).unwrap();
        assert_eq!(knn.predict_one(&[0.1]).unwrap(), "near");
    }

    #[test]
    fn test_k_larger_than_samples() {
        let knn = fitted();
        assert_eq!(knn.kneighbors(&[0.0, 0.0], 50).unwrap().len(), 6);
    }

    #[test]
    fn test_errors() {
        let knn = KnnClassifier::new(3);
        assert!(knn.kneighbors(&[0.0], 1).is_err());

        let mut knn = KnnClassifier::new(3);
        assert!(knn.fit(&array![[0.0], [1.0]], &labels(&["a"])).is_err());

        let knn = fitted();
        assert!(knn.kneighbors(&[0.0, 0.0, 0.0], 1).unwrap_err().is_client_error());
    }
}
