use breedmatch_common::schema::{dataset_header, TRAIT_MAX, TRAIT_MIN};
use breedmatch_common::{BreedMatchError, Result, Trait, TraitScores, FEATURE_COUNT};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One row of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedRecord {
    /// Breed name (unique)
    pub breed: String,

    /// Trait scores
    #[serde(flatten)]
    pub traits: TraitScores,
}

impl BreedRecord {
    pub fn new(breed: impl Into<String>, traits: TraitScores) -> Self {
        Self {
            breed: breed.into(),
            traits,
        }
    }
}

/// Ordered, immutable collection of breeds
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<BreedRecord>,
}

impl Dataset {
    /// Build from records, enforcing unique names and valid scores
    pub fn from_records(records: Vec<BreedRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (i, record) in records.iter().enumerate() {
            if record.breed.trim().is_empty() {
                return Err(BreedMatchError::dataset(format!("record {}: empty breed name", i)));
            }
            if !seen.insert(record.breed.as_str()) {
                return Err(BreedMatchError::dataset(format!(
                    "record {}: duplicate breed '{}'",
                    i, record.breed
                )));
            }
            record.traits.validate().map_err(|e| {
                BreedMatchError::dataset(format!("breed '{}': {}", record.breed, e))
            })?;
        }

        Ok(Self { records })
    }

    /// Load a dataset file
    ///
    /// The header must match the schema exactly. Row numbers in errors are
    /// file line numbers.
    pub fn load_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BreedMatchError::not_found(format!(
                "Dataset file {}",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let expected = dataset_header();
        if headers != expected {
            return Err(BreedMatchError::dataset(format!(
                "{}: unexpected header [{}], expected [{}]",
                path.display(),
                headers.join(", "),
                expected.join(", ")
            )));
        }

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let line = i + 2;
            let row = row?;

            let breed = row.get(0).unwrap_or_default().to_string();
            let mut values = [0u8; FEATURE_COUNT];
            for (slot, t) in values.iter_mut().zip(Trait::ALL) {
                let cell = row.get(t.index() + 1).unwrap_or_default();
                *slot = parse_score(cell).ok_or_else(|| {
                    BreedMatchError::dataset(format!(
                        "line {}: {} must be an integer in {}..={}, got '{}'",
                        line, t, TRAIT_MIN, TRAIT_MAX, cell
                    ))
                })?;
            }

            records.push(BreedRecord::new(breed, TraitScores::from_array(values)));
        }

        let dataset = Self::from_records(records)?;
        info!("Dataset loaded: {} breeds from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Write the dataset with the canonical header
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_csv_bytes()?)?;
        debug!("Dataset written: {} breeds to {}", self.len(), path.display());
        Ok(())
    }

    fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(dataset_header())?;
        for record in &self.records {
            let mut row = vec![record.breed.clone()];
            row.extend(record.traits.to_array().iter().map(u8::to_string));
            writer.write_record(&row)?;
        }
        writer
            .into_inner()
            .map_err(|e| BreedMatchError::internal(format!("CSV buffer: {}", e)))
    }

    /// SHA-256 of the canonical CSV serialization
    pub fn fingerprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.to_csv_bytes()?);
        Ok(hex::encode(digest))
    }

    pub fn records(&self) -> &[BreedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look a breed up by name
    pub fn get(&self, breed: &str) -> Option<&BreedRecord> {
        self.records.iter().find(|r| r.breed == breed)
    }

    pub fn breed_names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.breed.clone()).collect()
    }

    /// Trait values of one column
    pub fn column(&self, t: Trait) -> Vec<u8> {
        self.records.iter().map(|r| r.traits.get(t)).collect()
    }

    /// N x 10 matrix of raw trait values in schema order
    pub fn matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.records.len(), FEATURE_COUNT));
        for (mut row, record) in matrix.rows_mut().into_iter().zip(&self.records) {
            for (cell, value) in row.iter_mut().zip(record.traits.to_array()) {
                *cell = f64::from(value);
            }
        }
        matrix
    }
}

/// Parse a 1..=5 score; integral floats such as "4.0" are accepted
fn parse_score(cell: &str) -> Option<u8> {
    let value: f64 = cell.trim().parse().ok()?;
    if value.fract() != 0.0 || value < f64::from(TRAIT_MIN) || value > f64::from(TRAIT_MAX) {
        return None;
    }
    Some(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "breed,size,energy_level,trainability,good_with_kids,exercise_needs,barking_tendency,grooming_needs,apartment_friendly,good_alone,watchdog_ability";

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = write_file(&format!(
            "{}\nBeagle,3,4,3,5,4,3,2,3,2,3\n Chihuahua ,1,3,2,2,2,4,2,5,3,4\n",
            HEADER
        ));
        let dataset = Dataset::load_csv(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1].breed, "Chihuahua");
        assert_eq!(dataset.get("Beagle").unwrap().traits.good_with_kids, 5);

        let matrix = dataset.matrix();
        assert_eq!(matrix.dim(), (2, FEATURE_COUNT));
        assert_eq!(matrix[[1, 7]], 5.0);
    }

    #[test]
    fn test_integral_floats_accepted() {
        let file = write_file(&format!("{}\nPug,2.0,3,3,4,2,2,2,5,3,2\n", HEADER));
        let dataset = Dataset::load_csv(file.path()).unwrap();
        assert_eq!(dataset.records()[0].traits.size, 2);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let file = write_file(&format!("{}\nPug,2,3,3,4,2,2,2,7,3,2\n", HEADER));
        let err = Dataset::load_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("apartment_friendly"));

        let file = write_file(&format!("{}\nPug,2.5,3,3,4,2,2,2,4,3,2\n", HEADER));
        assert!(Dataset::load_csv(file.path()).is_err());
    }

    #[test]
    fn test_header_mismatch_rejected() {
        let file = write_file(
            "breed,energy_level,size,trainability,good_with_kids,exercise_needs,barking_tendency,grooming_needs,apartment_friendly,good_alone,watchdog_ability\nPug,2,3,3,4,2,2,2,4,3,2\n",
        );
        let err = Dataset::load_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("unexpected header"));
    }

    #[test]
    fn test_duplicate_breed_rejected() {
        let file = write_file(&format!(
            "{}\nPug,2,3,3,4,2,2,2,4,3,2\nPug,2,3,3,4,2,2,2,4,3,2\n",
            HEADER
        ));
        assert!(Dataset::load_csv(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::load_csv(Path::new("/nonexistent/breeds.csv")).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_write_then_load_preserves_order_and_fingerprint() {
        let dataset = Dataset::from_records(vec![
            BreedRecord::new("Zeta", TraitScores::uniform(5)),
            BreedRecord::new("Alpha", TraitScores::uniform(1)),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("breeds.csv");
        dataset.write_csv(&path).unwrap();

        let loaded = Dataset::load_csv(&path).unwrap();
        assert_eq!(loaded.breed_names(), vec!["Zeta", "Alpha"]);
        assert_eq!(loaded.fingerprint().unwrap(), dataset.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = Dataset::from_records(vec![BreedRecord::new("A", TraitScores::uniform(3))]).unwrap();
        let b = Dataset::from_records(vec![BreedRecord::new("A", TraitScores::uniform(4))]).unwrap();
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }
}
