//! K-Means clustering (Lloyd's algorithm, k-means++ initialization)

use breedmatch_common::{BreedMatchError, Result};
use breedmatch_vector::euclidean_distance;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// K-Means clustering model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    n_clusters: usize,
    max_iter: usize,
    tol: f64,
    seed: u64,
    centroids: Option<Array2<f64>>,
    inertia: f64,
    n_iter: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
            centroids: None,
            inertia: 0.0,
            n_iter: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn is_fitted(&self) -> bool {
        self.centroids.is_some()
    }

    /// Sum of squared distances of training rows to their centroid
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    /// Fit centroids to the rows of `x`
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if self.n_clusters == 0 {
            return Err(BreedMatchError::model("n_clusters must be at least 1"));
        }
        if n_samples < self.n_clusters {
            return Err(BreedMatchError::model(format!(
                "Cannot form {} clusters from {} samples",
                self.n_clusters, n_samples
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.init_plus_plus(x, &mut rng);
        let mut labels = vec![0usize; n_samples];

        self.n_iter = 0;
        for iter in 0..self.max_iter {
            self.n_iter = iter + 1;

            for (label, row) in labels.iter_mut().zip(x.rows()) {
                *label = nearest(&centroids, row).0;
            }

            let mut updated = centroids.clone();
            for (k, mut centroid) in updated.rows_mut().into_iter().enumerate() {
                let members: Vec<usize> = (0..n_samples).filter(|&i| labels[i] == k).collect();
                // An empty cluster keeps its previous centroid
                if members.is_empty() {
                    continue;
                }
                let mean = x
                    .select(Axis(0), &members)
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array1::zeros(x.ncols()));
                centroid.assign(&mean);
            }

            let shift: f64 = (&updated - &centroids).mapv(|v| v * v).sum();
            centroids = updated;
            if shift <= self.tol {
                break;
            }
        }

        self.inertia = x
            .rows()
            .into_iter()
            .map(|row| nearest(&centroids, row).1.powi(2))
            .sum();
        self.centroids = Some(centroids);

        debug!(
            "KMeans converged after {} iterations (inertia={:.4})",
            self.n_iter, self.inertia
        );
        Ok(())
    }

    /// k-means++: each new centroid is drawn with probability proportional
    /// to its squared distance from the closest centroid chosen so far
    fn init_plus_plus(&self, x: &Array2<f64>, rng: &mut StdRng) -> Array2<f64> {
        let n_samples = x.nrows();
        let mut chosen = vec![rng.random_range(0..n_samples)];

        while chosen.len() < self.n_clusters {
            let weights: Vec<f64> = x
                .rows()
                .into_iter()
                .map(|row| {
                    chosen
                        .iter()
                        .map(|&c| euclidean_distance(row, x.row(c)).powi(2))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = weights.iter().sum();

            let next = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                let mut pick = n_samples - 1;
                for (i, w) in weights.iter().enumerate() {
                    if target < *w {
                        pick = i;
                        break;
                    }
                    target -= w;
                }
                pick
            } else {
                // Every row coincides with a chosen centroid
                rng.random_range(0..n_samples)
            };
            chosen.push(next);
        }

        x.select(Axis(0), &chosen)
    }

    /// Cluster of a single vector
    pub fn predict_one(&self, v: &[f64]) -> Result<usize> {
        let centroids = self.fitted_centroids()?;
        if v.len() != centroids.ncols() {
            return Err(BreedMatchError::invalid_input(format!(
                "Expected {} features, got {}",
                centroids.ncols(),
                v.len()
            )));
        }
        Ok(nearest(centroids, ArrayView1::from(v)).0)
    }

    /// Cluster of every row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let centroids = self.fitted_centroids()?;
        if x.ncols() != centroids.ncols() {
            return Err(BreedMatchError::invalid_input(format!(
                "Expected {} features, got {}",
                centroids.ncols(),
                x.ncols()
            )));
        }
        Ok(x.rows().into_iter().map(|row| nearest(centroids, row).0).collect())
    }

    fn fitted_centroids(&self) -> Result<&Array2<f64>> {
        self.centroids
            .as_ref()
            .ok_or_else(|| BreedMatchError::model("KMeans model is not fitted"))
    }
}

/// (index, distance) of the closest centroid; ties go to the lower index
fn nearest(centroids: &Array2<f64>, row: ArrayView1<f64>) -> (usize, f64) {
    centroids
        .rows()
        .into_iter()
        .map(|c| euclidean_distance(row, c))
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, 0.2],
            [0.2, 0.1],
            [10.0, 10.0],
            [10.1, 9.9],
            [9.9, 10.2],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&blobs()).unwrap();
        let labels = kmeans.predict(&blobs()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert!(kmeans.inertia() < 1.0);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut a = KMeans::new(2).with_seed(7);
        let mut b = KMeans::new(2).with_seed(7);
        a.fit(&blobs()).unwrap();
        b.fit(&blobs()).unwrap();
        assert_eq!(a.centroids(), b.centroids());
    }

    #[test]
    fn test_predict_one_matches_predict() {
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&blobs()).unwrap();
        let labels = kmeans.predict(&blobs()).unwrap();
        assert_eq!(kmeans.predict_one(&[10.0, 10.0]).unwrap(), labels[3]);
        assert!(kmeans.predict_one(&[1.0]).is_err());
    }

    #[test]
    fn test_too_few_samples() {
        let mut kmeans = KMeans::new(5);
        assert!(kmeans.fit(&blobs().slice(ndarray::s![0..3, ..]).to_owned()).is_err());
        assert!(!kmeans.is_fitted());
        assert!(kmeans.predict_one(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_duplicate_rows() {
        let x = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&x).unwrap();
        assert_eq!(kmeans.inertia(), 0.0);
    }
}
