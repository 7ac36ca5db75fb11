//! CART decision trees and a bagged random forest classifier

use breedmatch_common::{BreedMatchError, Result};
use indicatif::ProgressBar;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Gini impurity of a class histogram
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent class; ties go to the lowest class index
fn majority(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (class, &c)| if c > best.1 { (class, c) } else { best })
        .0
}

/// Classification tree grown with Gini impurity
///
/// At every node only `max_features` randomly chosen features are
/// considered for the split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    max_features: Option<usize>,
    min_samples_leaf: usize,
    n_classes: usize,
    nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn new(max_features: Option<usize>, min_samples_leaf: usize) -> Self {
        Self {
            max_features,
            min_samples_leaf: min_samples_leaf.max(1),
            n_classes: 0,
            nodes: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Grow the tree over the rows listed in `samples`
    ///
    /// `y` holds class indices in `0..n_classes`. Rows may repeat (bootstrap).
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &[usize],
        samples: &[usize],
        n_classes: usize,
        rng: &mut StdRng,
    ) -> Result<()> {
        if samples.is_empty() {
            return Err(BreedMatchError::model("Cannot grow a tree from zero samples"));
        }
        if x.nrows() != y.len() {
            return Err(BreedMatchError::model(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(BreedMatchError::model(format!(
                "Class {} out of range for {} classes",
                bad, n_classes
            )));
        }

        self.n_classes = n_classes;
        self.nodes.clear();
        self.grow(x, y, samples.to_vec(), rng);
        Ok(())
    }

    /// Append the subtree for `samples`, returning its node index
    fn grow(&mut self, x: &Array2<f64>, y: &[usize], samples: Vec<usize>, rng: &mut StdRng) -> usize {
        let mut counts = vec![0usize; self.n_classes];
        for &i in &samples {
            counts[y[i]] += 1;
        }
        let impurity = gini(&counts, samples.len());

        let split = if impurity > 0.0 && samples.len() >= 2 * self.min_samples_leaf {
            self.best_split(x, y, &samples, impurity, rng)
        } else {
            None
        };

        let Some((feature, threshold)) = split else {
            self.nodes.push(Node::Leaf {
                class: majority(&counts),
            });
            return self.nodes.len() - 1;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) =
            samples.into_iter().partition(|&i| x[[i, feature]] <= threshold);

        // Reserve the slot, children are appended after it
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { class: 0 });
        let left = self.grow(x, y, left_samples, rng);
        let right = self.grow(x, y, right_samples, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Lowest weighted child impurity over the sampled features
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        samples: &[usize],
        parent_impurity: f64,
        rng: &mut StdRng,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(self.max_features.unwrap_or(n_features).clamp(1, n_features));

        let n = samples.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for &feature in &features {
            let mut sorted: Vec<(f64, usize)> = samples.iter().map(|&i| (x[[i, feature]], y[i])).collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            let mut right = vec![0usize; self.n_classes];
            for &(_, class) in &sorted {
                right[class] += 1;
            }

            for pos in 1..n {
                let (value, class) = sorted[pos - 1];
                left[class] += 1;
                right[class] -= 1;

                let next = sorted[pos].0;
                if value == next || pos < self.min_samples_leaf || n - pos < self.min_samples_leaf {
                    continue;
                }

                let weighted = (pos as f64 * gini(&left, pos) + (n - pos) as f64 * gini(&right, n - pos)) / n as f64;
                if weighted < parent_impurity && best.map_or(true, |b| weighted < b.2) {
                    best = Some((feature, (value + next) / 2.0, weighted));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }

    /// Class index for one row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<usize> {
        if self.nodes.is_empty() {
            return Err(BreedMatchError::model("Decision tree is not fitted"));
        }
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { class } => return Ok(*class),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().ok_or_else(|| {
                        BreedMatchError::invalid_input(format!("Row has no feature {}", feature))
                    })?;
                    id = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Bagged ensemble of decision trees voting on string labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    min_samples_leaf: usize,
    seed: u64,
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            min_samples_leaf: 1,
            seed: 42,
            classes: Vec::new(),
            trees: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf.max(1);
        self
    }

    /// Sorted distinct labels seen during fit
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Fit `n_estimators` trees, each on a bootstrap sample with
    /// `floor(sqrt(n_features))` candidate features per split
    pub fn fit(&mut self, x: &Array2<f64>, labels: &[String], progress: &ProgressBar) -> Result<()> {
        if x.nrows() != labels.len() {
            return Err(BreedMatchError::model(format!(
                "{} rows but {} labels",
                x.nrows(),
                labels.len()
            )));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(BreedMatchError::model("Cannot fit a forest on empty data"));
        }
        if self.n_estimators == 0 {
            return Err(BreedMatchError::model("n_estimators must be at least 1"));
        }

        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();
        let y: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();

        let max_features = ((x.ncols() as f64).sqrt().floor() as usize).max(1);
        let n = x.nrows();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            let mut tree_rng = StdRng::seed_from_u64(rng.random());
            let mut tree = DecisionTree::new(Some(max_features), self.min_samples_leaf);
            tree.fit(x, &y, &bootstrap, classes.len(), &mut tree_rng)?;
            trees.push(tree);
            progress.inc(1);
        }

        self.classes = classes;
        self.trees = trees;
        Ok(())
    }

    /// Majority vote of the trees for one row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<String> {
        if self.trees.is_empty() {
            return Err(BreedMatchError::model("Random forest is not fitted"));
        }
        let mut votes = vec![0usize; self.classes.len()];
        for tree in &self.trees {
            votes[tree.predict_row(row)?] += 1;
        }
        Ok(self.classes[majority(&votes)].clone())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}
