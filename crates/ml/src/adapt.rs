//! Conversion of the AKC breed-traits table (as published on Kaggle) into
//! the BreedMatch dataset layout

use breedmatch_common::schema::{TRAIT_MAX, TRAIT_MIN};
use breedmatch_common::{BreedMatchError, Result, TraitScores};
use breedmatch_vector::{BreedRecord, Dataset};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const COL_BREED: &str = "Breed";
const COL_AFFECTIONATE: &str = "Affectionate With Family";
const COL_YOUNG_CHILDREN: &str = "Good With Young Children";
const COL_TRAINABILITY: &str = "Trainability Level";
const COL_ENERGY: &str = "Energy Level";
const COL_BARKING: &str = "Barking Level";
const COL_GROOMING: &str = "Coat Grooming Frequency";
const COL_ADAPTABILITY: &str = "Adaptability Level";
const COL_WATCHDOG: &str = "Watchdog/Protective Nature";

/// Keyword to size, checked in order; the first keyword contained in the
/// breed name wins
const SIZE_KEYWORDS: [(&str, u8); 30] = [
    ("chihuahuas", 1),
    ("toy", 1),
    ("miniature", 1),
    ("yorkshire", 1),
    ("pomeranian", 1),
    ("maltese", 1),
    ("small", 2),
    ("terrier", 2),
    ("dachshund", 2),
    ("bulldog", 2),
    ("boston", 2),
    ("shih tzu", 2),
    ("medium", 3),
    ("beagle", 3),
    ("border", 3),
    ("cocker", 3),
    ("schnauzer", 3),
    ("poodle", 3),
    ("large", 4),
    ("labrador", 4),
    ("golden", 4),
    ("german shepherd", 4),
    ("boxer", 4),
    ("rottweiler", 4),
    ("husky", 4),
    ("giant", 5),
    ("great dane", 5),
    ("mastiff", 5),
    ("saint bernard", 5),
    ("st. bernard", 5),
];

const DEFAULT_SIZE: u8 = 3;

/// Counts from one adaptation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdaptReport {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
}

/// Size guessed from keywords in the breed name
pub fn estimate_size(breed: &str) -> u8 {
    let lower = breed.to_lowercase();
    SIZE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, size)| *size)
        .unwrap_or(DEFAULT_SIZE)
}

/// Round to the nearest score and clamp to 1..=5
fn clamp_score(value: f64) -> u8 {
    value.round().clamp(f64::from(TRAIT_MIN), f64::from(TRAIT_MAX)) as u8
}

struct Columns {
    breed: usize,
    affectionate: usize,
    young_children: usize,
    trainability: usize,
    energy: usize,
    barking: usize,
    grooming: usize,
    adaptability: usize,
    watchdog: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| BreedMatchError::dataset(format!("Missing column '{}'", name)))
        };
        Ok(Self {
            breed: find(COL_BREED)?,
            affectionate: find(COL_AFFECTIONATE)?,
            young_children: find(COL_YOUNG_CHILDREN)?,
            trainability: find(COL_TRAINABILITY)?,
            energy: find(COL_ENERGY)?,
            barking: find(COL_BARKING)?,
            grooming: find(COL_GROOMING)?,
            adaptability: find(COL_ADAPTABILITY)?,
            watchdog: find(COL_WATCHDOG)?,
        })
    }
}

/// Read an AKC traits table and map every usable row onto the schema
///
/// * good_with_kids: mean of family affection and young-children scores,
///   rounded half to even
/// * size: [`estimate_size`]
/// * exercise_needs: copied from energy level
/// * good_alone: `5 - family affection`, clamped to 1..=5
///
/// Rows with a missing or non-numeric score, an empty name, or a name seen
/// before are skipped.
pub fn adapt_kaggle<R: Read>(input: R) -> Result<(Dataset, AdaptReport)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let columns = Columns::locate(reader.headers()?)?;

    let mut report = AdaptReport::default();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (i, row) in reader.records().enumerate() {
        let line = i + 2;
        let row = row?;
        report.rows_read += 1;

        let breed = row.get(columns.breed).unwrap_or_default().trim().to_string();
        let number = |idx: usize| row
            .get(idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());

        let scores = (|| {
            let affectionate = number(columns.affectionate)?;
            let young_children = number(columns.young_children)?;
            let energy = clamp_score(number(columns.energy)?);
            Some(TraitScores {
                size: estimate_size(&breed),
                energy_level: energy,
                trainability: clamp_score(number(columns.trainability)?),
                good_with_kids: clamp_score(((affectionate + young_children) / 2.0).round_ties_even()),
                exercise_needs: energy,
                barking_tendency: clamp_score(number(columns.barking)?),
                grooming_needs: clamp_score(number(columns.grooming)?),
                apartment_friendly: clamp_score(number(columns.adaptability)?),
                good_alone: clamp_score(5.0 - affectionate),
                watchdog_ability: clamp_score(number(columns.watchdog)?),
            })
        })();

        let Some(scores) = scores else {
            warn!("line {}: skipping '{}', missing or non-numeric score", line, breed);
            report.rows_skipped += 1;
            continue;
        };
        if breed.is_empty() {
            warn!("line {}: skipping row without a breed name", line);
            report.rows_skipped += 1;
            continue;
        }
        if !seen.insert(breed.clone()) {
            warn!("line {}: skipping duplicate breed '{}'", line, breed);
            report.rows_skipped += 1;
            continue;
        }

        records.push(BreedRecord::new(breed, scores));
    }

    report.rows_written = records.len();
    Ok((Dataset::from_records(records)?, report))
}

/// Adapt `input` and write the result to `output`
pub fn adapt_kaggle_file(input: &Path, output: &Path) -> Result<AdaptReport> {
    let file = std::fs::File::open(input).map_err(|e| {
        BreedMatchError::file_system(format!("Failed to open {}: {}", input.display(), e))
    })?;
    let (dataset, report) = adapt_kaggle(file)?;
    dataset.write_csv(output)?;

    info!(
        "Adapted {} of {} breeds into {} ({} skipped)",
        report.rows_written,
        report.rows_read,
        output.display(),
        report.rows_skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Breed,Affectionate With Family,Good With Young Children,Good With Other Dogs,Shedding Level,Coat Grooming Frequency,Drooling Level,Coat Type,Coat Length,Openness To Strangers,Playfulness Level,Watchdog/Protective Nature,Adaptability Level,Trainability Level,Energy Level,Barking Level,Mental Stimulation Needs";

    #[test]
    fn test_estimate_size() {
        assert_eq!(estimate_size("Chihuahuas"), 1);
        assert_eq!(estimate_size("Retrievers (Labrador)"), 4);
        assert_eq!(estimate_size("Great Danes"), 5);
        assert_eq!(estimate_size("Yorkshire Terriers"), 1);
        assert_eq!(estimate_size("Bull Terriers"), 2);
        assert_eq!(estimate_size("Vizslas"), 3);
    }

    #[test]
    fn test_adapt_rows() {
        let csv = format!(
            "{}\n\
             Retrievers (Labrador),5,5,5,4,2,2,Double,Short,5,5,3,5,5,5,3,4\n\
             Bulldogs,4,3,3,3,3,3,Smooth,Short,4,4,3,3,4,3,2,3\n",
            HEADER
        );
        let (dataset, report) = adapt_kaggle(csv.as_bytes()).unwrap();

        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_written, 2);

        let lab = dataset.get("Retrievers (Labrador)").unwrap().traits;
        assert_eq!(lab.size, 4);
        assert_eq!(lab.good_with_kids, 5);
        assert_eq!(lab.good_alone, 1);
        assert_eq!(lab.exercise_needs, lab.energy_level);
        assert_eq!(lab.watchdog_ability, 3);
        assert_eq!(lab.apartment_friendly, 5);

        let bulldog = dataset.get("Bulldogs").unwrap().traits;
        assert_eq!(bulldog.size, 2);
        // (4 + 3) / 2 = 3.5 rounds to 4
        assert_eq!(bulldog.good_with_kids, 4);
        assert_eq!(bulldog.good_alone, 1);
        assert_eq!(bulldog.grooming_needs, 3);
    }

    #[test]
    fn test_half_rounds_to_even() {
        let csv = format!("{}\nBeagles,3,2,5,3,2,1,Smooth,Short,3,4,2,4,3,4,4,4\n", HEADER);
        let (dataset, _) = adapt_kaggle(csv.as_bytes()).unwrap();
        let beagle = dataset.get("Beagles").unwrap().traits;
        // (3 + 2) / 2 = 2.5 rounds to 2
        assert_eq!(beagle.good_with_kids, 2);
        assert_eq!(beagle.good_alone, 2);
    }

    #[test]
    fn test_bad_rows_skipped() {
        let csv = format!(
            "{}\n\
             Plott Hounds,,3,3,3,1,1,Smooth,Short,3,3,3,3,3,3,3,3\n\
             Pugs,5,5,4,4,2,1,Smooth,Short,5,5,3,5,4,3,1,3\n\
             Pugs,5,5,4,4,2,1,Smooth,Short,5,5,3,5,4,3,1,3\n",
            HEADER
        );
        let (dataset, report) = adapt_kaggle(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(report.rows_skipped, 2);
    }

    #[test]
    fn test_non_finite_scores_skipped() {
        let csv = format!(
            "{}\n\
             Plott Hounds,3,3,3,3,1,1,Smooth,Short,3,3,3,3,NaN,3,3,3\n\
             Salukis,3,3,3,3,1,1,Smooth,Short,3,3,3,3,3,inf,3,3\n\
             Pugs,5,5,4,4,2,1,Smooth,Short,5,5,3,5,4,3,1,3\n",
            HEADER
        );
        let (dataset, report) = adapt_kaggle(csv.as_bytes()).unwrap();
        assert_eq!(report.rows_written, 1);
        assert_eq!(report.rows_skipped, 2);
        assert!(dataset.get("Pugs").is_some());
    }

    #[test]
    fn test_fractional_scores_round() {
        let csv = format!("{}\nBasenjis,3,3,3,3,1,1,Smooth,Short,3,3,2.4,3,3.9,3,1.6,3\n", HEADER);
        let (dataset, _) = adapt_kaggle(csv.as_bytes()).unwrap();
        let basenji = dataset.get("Basenjis").unwrap().traits;
        assert_eq!(basenji.trainability, 4);
        assert_eq!(basenji.watchdog_ability, 2);
        assert_eq!(basenji.barking_tendency, 2);
    }

    #[test]
    fn test_missing_column() {
        let csv = "Breed,Energy Level\nPugs,3\n";
        let err = adapt_kaggle(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Affectionate With Family"));
    }

    #[test]
    fn test_adapt_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("breed_traits.csv");
        let output = dir.path().join("out").join("dog_breeds_dataset.csv");
        std::fs::write(
            &input,
            format!("{}\nPoodles,5,5,3,1,4,1,Curly,Long,5,5,5,4,5,4,4,5\n", HEADER),
        )
        .unwrap();

        let report = adapt_kaggle_file(&input, &output).unwrap();
        assert_eq!(report.rows_written, 1);
        let dataset = Dataset::load_csv(&output).unwrap();
        assert_eq!(dataset.records()[0].traits.size, 3);
    }
}
