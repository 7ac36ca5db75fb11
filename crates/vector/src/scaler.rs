use breedmatch_common::{BreedMatchError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as zero variance
pub const MIN_STD: f64 = 1e-10;

/// Per-feature standardization: z = (x - mean) / scale
///
/// `scale` is the population standard deviation of the feature, or 1.0 when
/// the feature has no variance. A constant feature therefore maps to the
/// plain offset `x - mean`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerParams")]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
    scale: Vec<f64>,
    n_samples: usize,
}

/// Persisted form; `scale` is rederived from `std` on load
#[derive(Deserialize)]
struct ScalerParams {
    mean: Vec<f64>,
    std: Vec<f64>,
    #[serde(default)]
    n_samples: usize,
}

impl TryFrom<ScalerParams> for StandardScaler {
    type Error = BreedMatchError;

    fn try_from(params: ScalerParams) -> Result<Self> {
        let mut scaler = Self::from_parts(params.mean, params.std)?;
        scaler.n_samples = params.n_samples;
        Ok(scaler)
    }
}

impl StandardScaler {
    /// Fit over the rows of `x`
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(BreedMatchError::model("Cannot fit scaler with zero samples"));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| BreedMatchError::model("Cannot compute feature means"))?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = std.mapv(|s| if s < MIN_STD { 1.0 } else { s });

        Ok(Self {
            mean: mean.to_vec(),
            std: std.to_vec(),
            scale: scale.to_vec(),
            n_samples,
        })
    }

    /// Build from explicit parameters, applying the zero-variance floor
    pub fn from_parts(mean: Vec<f64>, std: Vec<f64>) -> Result<Self> {
        if mean.len() != std.len() {
            return Err(BreedMatchError::model(format!(
                "Scaler mean has {} features but std has {}",
                mean.len(),
                std.len()
            )));
        }
        if mean.iter().any(|m| !m.is_finite()) {
            return Err(BreedMatchError::model("Scaler mean must be finite"));
        }
        if std.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(BreedMatchError::model("Scaler std must be finite and non-negative"));
        }
        let scale = std.iter().map(|&s| if s < MIN_STD { 1.0 } else { s }).collect();
        Ok(Self {
            mean,
            std,
            scale,
            n_samples: 0,
        })
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Divisors actually applied (std with the zero-variance floor)
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Standardize one vector
    pub fn transform_row(&self, x: &[f64]) -> Result<Array1<f64>> {
        self.transform_view(ArrayView1::from(x))
    }

    pub fn transform_view(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_width(x.len())?;
        Ok(Array1::from_iter(
            x.iter()
                .zip(self.mean.iter().zip(&self.scale))
                .map(|(v, (m, s))| (v - m) / s),
        ))
    }

    /// Standardize every row of `x`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;
        let mean = ArrayView1::from(self.mean.as_slice());
        let scale = ArrayView1::from(self.scale.as_slice());
        Ok((x - &mean) / &scale)
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.n_features() {
            return Err(BreedMatchError::invalid_input(format!(
                "Expected {} features, got {}",
                self.n_features(),
                width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_population_std() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        assert_eq!(scaler.mean(), &[3.0, 10.0]);
        let expected_std = (8.0f64 / 3.0).sqrt();
        assert!((scaler.std()[0] - expected_std).abs() < 1e-12);
        assert_eq!(scaler.std()[1], 0.0);
        assert_eq!(scaler.n_samples(), 3);
    }

    #[test]
    fn test_transform_centers_and_scales() {
        let x = array![[1.0, 2.0], [3.0, 6.0], [5.0, 10.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let z = scaler.transform(&x).unwrap();

        for col in z.columns() {
            assert!(col.sum().abs() < 1e-12);
            let var = col.mapv(|v| v * v).sum() / 3.0;
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_variance_feature_is_offset() {
        let x = array![[2.0, 4.0], [4.0, 4.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        assert_eq!(scaler.scale()[1], 1.0);

        let z = scaler.transform_row(&[3.0, 5.0]).unwrap();
        assert!(z.iter().all(|v| v.is_finite()));
        assert_eq!(z[0], 0.0);
        assert_eq!(z[1], 1.0);
    }

    #[test]
    fn test_row_and_matrix_agree() {
        let x = array![[1.0, 5.0, 2.0], [2.0, 1.0, 2.0], [4.0, 3.0, 5.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let z = scaler.transform(&x).unwrap();
        let row = scaler.transform_view(x.row(2)).unwrap();
        assert_eq!(z.row(2), row);
    }

    #[test]
    fn test_width_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let err = scaler.transform_row(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.is_client_error());
        assert!(scaler.transform(&array![[1.0], [2.0]]).is_err());
    }

    #[test]
    fn test_empty_fit_fails() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(&x).is_err());
    }

    #[test]
    fn test_from_parts() {
        let scaler = StandardScaler::from_parts(vec![1.0, 2.0], vec![0.5, 0.0]).unwrap();
        assert_eq!(scaler.scale(), &[0.5, 1.0]);
        assert!(StandardScaler::from_parts(vec![1.0], vec![1.0, 2.0]).is_err());
        assert!(StandardScaler::from_parts(vec![1.0], vec![-1.0]).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let x = array![[1.0, 2.0], [3.0, 5.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(scaler, restored);
    }

    #[test]
    fn test_deserialize_applies_zero_variance_floor() {
        let json = r#"{"mean":[1.0,2.0],"std":[0.5,0.0],"scale":[0.5,0.0],"n_samples":4}"#;
        let scaler: StandardScaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.scale(), &[0.5, 1.0]);
        assert_eq!(scaler.n_samples(), 4);

        let z = scaler.transform_row(&[1.0, 3.0]).unwrap();
        assert!(z.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_deserialize_rejects_invalid_params() {
        let negative = r#"{"mean":[1.0],"std":[-1.0],"scale":[1.0],"n_samples":2}"#;
        assert!(serde_json::from_str::<StandardScaler>(negative).is_err());

        let mismatched = r#"{"mean":[1.0,2.0],"std":[1.0],"scale":[1.0],"n_samples":2}"#;
        assert!(serde_json::from_str::<StandardScaler>(mismatched).is_err());

        let not_finite = r#"{"mean":[null],"std":[1.0],"scale":[1.0],"n_samples":2}"#;
        assert!(serde_json::from_str::<StandardScaler>(not_finite).is_err());
    }
}
