//! Descriptive statistics over the breed dataset

use breedmatch_common::Trait;
use breedmatch_vector::Dataset;
use serde::Serialize;
use std::collections::BTreeMap;

/// Traits summarized on the analytics page (size is reported as a distribution)
pub const SUMMARY_TRAITS: [Trait; 9] = [
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

/// Summary of one trait column, values rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitSummary {
    pub feature: &'static str,
    pub label: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined below two rows
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStatistics {
    pub total_breeds: usize,
    pub statistics: Vec<TraitSummary>,
    /// Number of breeds per size score
    pub size_distribution: BTreeMap<u8, usize>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quantile of sorted values with linear interpolation between ranks
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn summarize(dataset: &Dataset, t: Trait) -> TraitSummary {
    let mut values: Vec<f64> = dataset.column(t).into_iter().map(f64::from).collect();
    values.sort_by(f64::total_cmp);
    let n = values.len();

    if n == 0 {
        return TraitSummary {
            feature: t.name(),
            label: t.label(),
            count: 0,
            mean: 0.0,
            std: None,
            min: 0.0,
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
            max: 0.0,
        };
    }

    let m = mean(&values);
    let std = (n > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
        round2((ss / (n - 1) as f64).sqrt())
    });

    TraitSummary {
        feature: t.name(),
        label: t.label(),
        count: n,
        mean: round2(m),
        std,
        min: values[0],
        p25: round2(quantile(&values, 0.25)),
        p50: round2(quantile(&values, 0.5)),
        p75: round2(quantile(&values, 0.75)),
        max: values[n - 1],
    }
}

pub fn dataset_statistics(dataset: &Dataset) -> DatasetStatistics {
    DatasetStatistics {
        total_breeds: dataset.len(),
        statistics: SUMMARY_TRAITS.iter().map(|&t| summarize(dataset, t)).collect(),
        size_distribution: value_counts(dataset, Trait::Size),
    }
}

/// Number of breeds per score of `t`, in ascending score order
pub fn value_counts(dataset: &Dataset, t: Trait) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for value in dataset.column(t) {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Pearson correlation between every pair of `traits`
///
/// A pair involving a constant column has no defined correlation and is
/// reported as `None`.
pub fn correlation_matrix(dataset: &Dataset, traits: &[Trait]) -> Vec<Vec<Option<f64>>> {
    let columns: Vec<Vec<f64>> = traits
        .iter()
        .map(|&t| dataset.column(t).into_iter().map(f64::from).collect())
        .collect();
    let means: Vec<f64> = columns
        .iter()
        .map(|c| if c.is_empty() { 0.0 } else { mean(c) })
        .collect();

    let mut matrix = vec![vec![None; traits.len()]; traits.len()];
    for i in 0..traits.len() {
        for j in i..traits.len() {
            let (mut cov, mut var_i, mut var_j) = (0.0, 0.0, 0.0);
            for (a, b) in columns[i].iter().zip(&columns[j]) {
                let (da, db) = (a - means[i], b - means[j]);
                cov += da * db;
                var_i += da * da;
                var_j += db * db;
            }
            let r = (var_i > 0.0 && var_j > 0.0)
                .then(|| (cov / (var_i * var_j).sqrt()).clamp(-1.0, 1.0));
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

/// The `n` breeds scoring highest on `t`; equal scores keep dataset order
pub fn top_breeds(dataset: &Dataset, t: Trait, n: usize) -> Vec<(String, u8)> {
    let mut rows: Vec<(String, u8)> = dataset
        .records()
        .iter()
        .map(|r| (r.breed.clone(), r.traits.get(t)))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use breedmatch_common::TraitScores;
    use breedmatch_vector::BreedRecord;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            BreedRecord::new("A", TraitScores::from_array([1, 5, 1, 3, 5, 2, 1, 1, 3, 4])),
            BreedRecord::new("B", TraitScores::from_array([3, 3, 2, 3, 3, 2, 2, 2, 3, 4])),
            BreedRecord::new("C", TraitScores::from_array([3, 4, 3, 3, 4, 2, 3, 3, 3, 4])),
            BreedRecord::new("D", TraitScores::from_array([5, 1, 4, 3, 1, 2, 4, 4, 3, 4])),
        ])
        .unwrap()
    }

    #[test]
    fn test_quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.75), 3.25);
        assert_eq!(quantile(&[7.0], 0.5), 7.0);
    }

    #[test]
    fn test_statistics() {
        let stats = dataset_statistics(&dataset());
        assert_eq!(stats.total_breeds, 4);
        assert_eq!(stats.statistics.len(), 9);

        let energy = &stats.statistics[0];
        assert_eq!(energy.feature, "energy_level");
        assert_eq!(energy.count, 4);
        assert_eq!(energy.mean, 3.25);
        // sample std of [1, 3, 4, 5]
        assert_eq!(energy.std, Some(1.71));
        assert_eq!(energy.min, 1.0);
        assert_eq!(energy.p25, 2.5);
        assert_eq!(energy.p50, 3.5);
        assert_eq!(energy.p75, 4.25);
        assert_eq!(energy.max, 5.0);

        let mut sizes = BTreeMap::new();
        sizes.insert(1, 1);
        sizes.insert(3, 2);
        sizes.insert(5, 1);
        assert_eq!(stats.size_distribution, sizes);
    }

    #[test]
    fn test_statistics_json_keys() {
        let json = serde_json::to_value(dataset_statistics(&dataset())).unwrap();
        assert_eq!(json["statistics"][1]["feature"], "trainability");
        assert_eq!(json["statistics"][1]["50%"], 2.5);
        assert_eq!(json["size_distribution"]["3"], 2);
    }

    #[test]
    fn test_correlation() {
        let traits = [Trait::EnergyLevel, Trait::ExerciseNeeds, Trait::Trainability, Trait::GoodWithKids];
        let m = correlation_matrix(&dataset(), &traits);

        assert!((m[0][1].unwrap() - 1.0).abs() < 1e-12);
        assert!((m[0][2].unwrap() + 0.8315).abs() < 1e-3);
        assert_eq!(m[0][2], m[2][0]);
        // good_with_kids is constant
        assert_eq!(m[3][0], None);
        assert_eq!(m[3][3], None);
    }

    #[test]
    fn test_top_breeds_ties_keep_order() {
        let top = top_breeds(&dataset(), Trait::Size, 3);
        assert_eq!(
            top,
            vec![("D".to_string(), 5), ("B".to_string(), 3), ("C".to_string(), 3)]
        );
        assert_eq!(top_breeds(&dataset(), Trait::Size, 10).len(), 4);
    }
}
