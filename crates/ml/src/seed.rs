use breedmatch_common::TraitScores;
use breedmatch_vector::{BreedRecord, Dataset};

/// Built-in starter dataset: 25 popular breeds
///
/// Columns: size, energy_level, trainability, good_with_kids,
/// exercise_needs, barking_tendency, grooming_needs, apartment_friendly,
/// good_alone, watchdog_ability
const SEED_BREEDS: [(&str, [u8; 10]); 25] = [
    ("Golden Retriever", [4, 4, 5, 5, 4, 2, 3, 3, 3, 3]),
    ("French Bulldog", [2, 2, 2, 4, 1, 2, 2, 5, 4, 2]),
    ("German Shepherd", [4, 4, 5, 4, 4, 3, 3, 2, 2, 5]),
    ("Labrador Retriever", [4, 4, 5, 5, 4, 2, 2, 2, 3, 3]),
    ("Chihuahua", [1, 3, 2, 2, 2, 4, 2, 5, 3, 4]),
    ("Poodle", [3, 3, 5, 4, 3, 2, 5, 4, 3, 2]),
    ("Rottweiler", [5, 3, 4, 3, 3, 2, 2, 1, 2, 5]),
    ("Beagle", [3, 4, 3, 5, 4, 3, 2, 3, 2, 3]),
    ("Yorkshire Terrier", [1, 3, 3, 3, 2, 4, 4, 5, 2, 3]),
    ("Boxer", [4, 4, 3, 4, 4, 2, 1, 2, 3, 4]),
    ("Husky", [4, 5, 3, 4, 5, 3, 3, 1, 1, 3]),
    ("Border Collie", [3, 5, 5, 4, 5, 2, 3, 2, 2, 3]),
    ("Dachshund", [2, 3, 3, 4, 3, 3, 2, 4, 3, 3]),
    ("Shih Tzu", [2, 2, 3, 4, 2, 3, 4, 5, 3, 2]),
    ("Boston Terrier", [2, 3, 4, 4, 3, 2, 1, 5, 4, 3]),
    ("Pomeranian", [1, 3, 3, 3, 2, 4, 4, 5, 2, 3]),
    ("Australian Shepherd", [4, 5, 5, 4, 5, 2, 3, 2, 2, 4]),
    ("Siberian Husky", [4, 5, 3, 4, 5, 3, 3, 1, 1, 3]),
    ("Cocker Spaniel", [3, 3, 4, 4, 3, 2, 3, 4, 3, 3]),
    ("Maltese", [1, 2, 3, 4, 2, 3, 4, 5, 2, 2]),
    ("Jack Russell Terrier", [2, 5, 3, 3, 4, 4, 2, 3, 2, 4]),
    ("Pit Bull", [4, 4, 3, 3, 4, 2, 1, 2, 3, 4]),
    ("Great Dane", [5, 2, 3, 4, 2, 1, 1, 2, 3, 3]),
    ("Doberman", [4, 4, 4, 3, 4, 2, 1, 2, 3, 5]),
    ("Schnauzer", [3, 3, 4, 4, 3, 3, 3, 4, 3, 4]),
];

/// The built-in dataset, ready to write with [`Dataset::write_csv`]
pub fn seed_dataset() -> Dataset {
    let records = SEED_BREEDS
        .iter()
        .map(|(name, values)| BreedRecord::new(*name, TraitScores::from_array(*values)))
        .collect();
    // Names are unique and every score is within 1..=5
    Dataset::from_records(records).unwrap_or_else(|e| panic!("invalid seed dataset: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_dataset_is_valid() {
        let dataset = seed_dataset();
        assert_eq!(dataset.len(), 25);
        assert_eq!(dataset.records()[0].breed, "Golden Retriever");
        assert_eq!(dataset.get("Great Dane").unwrap().traits.size, 5);
    }
}
