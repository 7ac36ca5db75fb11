use breedmatch_common::{BreedMatchError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `0..n` and split it into (train, test) index sets
///
/// The test set holds `ceil(n * test_size)` rows; both sets are non-empty.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if n < 2 {
        return Err(BreedMatchError::model(format!(
            "Need at least 2 samples to split, got {}",
            n
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(BreedMatchError::invalid_input(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // 10 * 0.3 is 3.0000000000000004 in f64
    let n_test = ((n as f64) * test_size - 1e-9).ceil() as usize;
    let n_test = n_test.clamp(1, n - 1);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Fraction of matching labels
pub fn accuracy<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    correct as f64 / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(25, 0.3, 42).unwrap();
        assert_eq!(test.len(), 8);
        assert_eq!(train.len(), 17);

        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 25);
    }

    #[test]
    fn test_split_size_ignores_float_noise() {
        let (train, test) = train_test_split(10, 0.3, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(
            train_test_split(50, 0.3, 7).unwrap(),
            train_test_split(50, 0.3, 7).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_bad_input() {
        assert!(train_test_split(1, 0.3, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
        assert!(train_test_split(10, 0.0, 42).is_err());
    }

    #[test]
    fn test_split_keeps_both_sides_non_empty() {
        let (train, test) = train_test_split(2, 0.9, 1).unwrap();
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&["a", "b", "c", "d"], &["a", "x", "c", "y"]), 0.5);
        assert_eq!(accuracy::<u8>(&[], &[]), 0.0);
    }
}
