//! Feature schema shared by the trainer and the server
//!
//! The order of [`Trait::ALL`] is the column order of the dataset, the
//! feature order of every fitted model, and the order of every trait vector.
//! Bundles record [`SCHEMA_VERSION`] and the feature names; both are checked
//! when a bundle is loaded.

use crate::error::BreedMatchError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bumped whenever traits are added, removed or reordered
pub const SCHEMA_VERSION: u32 = 1;

/// Number of traits per breed
pub const FEATURE_COUNT: usize = 10;

/// Name of the key column in the dataset file
pub const BREED_COLUMN: &str = "breed";

/// Lowest valid trait score
pub const TRAIT_MIN: u8 = 1;

/// Highest valid trait score
pub const TRAIT_MAX: u8 = 5;

/// A breed characteristic scored on the 1..=5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Size,
    EnergyLevel,
    Trainability,
    GoodWithKids,
    ExerciseNeeds,
    BarkingTendency,
    GroomingNeeds,
    ApartmentFriendly,
    GoodAlone,
    WatchdogAbility,
}

impl Trait {
    /// All traits in canonical order
    pub const ALL: [Trait; FEATURE_COUNT] = [
        Trait::Size,
        Trait::EnergyLevel,
        Trait::Trainability,
        Trait::GoodWithKids,
        Trait::ExerciseNeeds,
        Trait::BarkingTendency,
        Trait::GroomingNeeds,
        Trait::ApartmentFriendly,
        Trait::GoodAlone,
        Trait::WatchdogAbility,
    ];

    /// Column / field name
    pub fn name(self) -> &'static str {
        match self {
            Trait::Size => "size",
            Trait::EnergyLevel => "energy_level",
            Trait::Trainability => "trainability",
            Trait::GoodWithKids => "good_with_kids",
            Trait::ExerciseNeeds => "exercise_needs",
            Trait::BarkingTendency => "barking_tendency",
            Trait::GroomingNeeds => "grooming_needs",
            Trait::ApartmentFriendly => "apartment_friendly",
            Trait::GoodAlone => "good_alone",
            Trait::WatchdogAbility => "watchdog_ability",
        }
    }

    /// Human readable description of the scale
    pub fn description(self) -> &'static str {
        match self {
            Trait::Size => "Size (1=very small, 5=very large)",
            Trait::EnergyLevel => "Energy level (1=calm, 5=very active)",
            Trait::Trainability => "Ease of training (1=difficult, 5=easy)",
            Trait::GoodWithKids => "Good with kids (1=not recommended, 5=excellent)",
            Trait::ExerciseNeeds => "Exercise needs (1=little, 5=a lot)",
            Trait::BarkingTendency => "Barking tendency (1=quiet, 5=barks a lot)",
            Trait::GroomingNeeds => "Grooming needs (1=little, 5=a lot)",
            Trait::ApartmentFriendly => "Apartment friendly (1=no, 5=perfect)",
            Trait::GoodAlone => "Tolerates being alone (1=does not, 5=very independent)",
            Trait::WatchdogAbility => "Watchdog ability (1=not protective, 5=excellent guard)",
        }
    }

    /// Title-cased label for charts and tables ("Energy Level")
    pub fn label(self) -> String {
        self.name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Position in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look a trait up by its column name
    pub fn from_name(name: &str) -> Option<Trait> {
        Trait::ALL.iter().copied().find(|t| t.name() == name.trim())
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Feature names in canonical order
pub fn feature_names() -> Vec<String> {
    Trait::ALL.iter().map(|t| t.name().to_string()).collect()
}

/// Exact header row of the dataset file
pub fn dataset_header() -> Vec<&'static str> {
    std::iter::once(BREED_COLUMN)
        .chain(Trait::ALL.iter().map(|t| t.name()))
        .collect()
}

/// Verify a persisted feature list agrees with the schema in count and order
pub fn check_features(features: &[String]) -> Result<()> {
    if features.len() != FEATURE_COUNT {
        return Err(BreedMatchError::config(format!(
            "Expected {} features, found {}",
            FEATURE_COUNT,
            features.len()
        )));
    }

    for (position, (found, expected)) in features.iter().zip(Trait::ALL.iter()).enumerate() {
        if found != expected.name() {
            return Err(BreedMatchError::config(format!(
                "Feature {} is '{}', expected '{}'",
                position,
                found,
                expected.name()
            )));
        }
    }

    Ok(())
}

/// One score per trait
///
/// Used both for a breed's characteristics and for a user's preferences.
/// Deserializes from form submissions and JSON alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitScores {
    pub size: u8,
    pub energy_level: u8,
    pub trainability: u8,
    pub good_with_kids: u8,
    pub exercise_needs: u8,
    pub barking_tendency: u8,
    pub grooming_needs: u8,
    pub apartment_friendly: u8,
    pub good_alone: u8,
    pub watchdog_ability: u8,
}

impl TraitScores {
    /// Build from values in canonical order
    pub fn from_array(values: [u8; FEATURE_COUNT]) -> Self {
        let [size, energy_level, trainability, good_with_kids, exercise_needs, barking_tendency, grooming_needs, apartment_friendly, good_alone, watchdog_ability] =
            values;
        Self {
            size,
            energy_level,
            trainability,
            good_with_kids,
            exercise_needs,
            barking_tendency,
            grooming_needs,
            apartment_friendly,
            good_alone,
            watchdog_ability,
        }
    }

    /// Same score for every trait
    pub fn uniform(value: u8) -> Self {
        Self::from_array([value; FEATURE_COUNT])
    }

    /// Values in canonical order
    pub fn to_array(&self) -> [u8; FEATURE_COUNT] {
        [
            self.size,
            self.energy_level,
            self.trainability,
            self.good_with_kids,
            self.exercise_needs,
            self.barking_tendency,
            self.grooming_needs,
            self.apartment_friendly,
            self.good_alone,
            self.watchdog_ability,
        ]
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.to_array().iter().map(|&v| f64::from(v)).collect()
    }

    pub fn get(&self, t: Trait) -> u8 {
        self.to_array()[t.index()]
    }

    /// Return a copy with one trait replaced
    pub fn with(&self, t: Trait, value: u8) -> Self {
        let mut values = self.to_array();
        values[t.index()] = value;
        Self::from_array(values)
    }

    /// Pairs of (trait, score) in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Trait, u8)> + '_ {
        Trait::ALL.iter().map(move |&t| (t, self.get(t)))
    }

    /// Reject any score outside 1..=5
    pub fn validate(&self) -> Result<()> {
        for (t, value) in self.iter() {
            if !(TRAIT_MIN..=TRAIT_MAX).contains(&value) {
                return Err(BreedMatchError::invalid_input(format!(
                    "{} must be between {} and {}, got {}",
                    t.name(),
                    TRAIT_MIN,
                    TRAIT_MAX,
                    value
                )));
            }
        }
        Ok(())
    }
}
