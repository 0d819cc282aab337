//! High-expense classification: seeded train/holdout split, two independent
//! models behind the [`Classifier`] contract, and holdout evaluation.

pub mod forest;
pub mod logistic;
pub mod metrics;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{CamaraError, Result};
use crate::features::Features;
use crate::settings::ModelSettings;

pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use metrics::{classification_report, ClassificationReport, ConfusionMatrix};

/// A binary classifier over numeric features.
pub trait Classifier {
    fn name(&self) -> &str;
    fn fit(&mut self, x: &Features, y: &[u8]) -> Result<()>;
    fn predict(&self, x: &Features) -> Result<Vec<u8>>;
}

fn to_matrix(x: &Features) -> DenseMatrix<f64> {
    DenseMatrix::from_2d_vec(&x.rows)
}

fn to_targets(y: &[u8]) -> Vec<i32> {
    y.iter().map(|&l| i32::from(l)).collect()
}

fn from_targets(y: &[i32]) -> Vec<u8> {
    y.iter().map(|&l| u8::from(l == 1)).collect()
}

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Shuffles `0..n` with a seeded generator and withholds
/// `ceil(n * test_fraction)` rows.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let n_holdout = ((n as f64 * test_fraction).ceil() as usize).min(n);
    let train = indices.split_off(n_holdout);
    Split {
        train,
        holdout: indices,
    }
}

pub(crate) fn ensure_both_classes(labels: &[u8], partition: &str) -> Result<()> {
    let ones = labels.iter().filter(|&&l| l == 1).count();
    if ones == 0 || ones == labels.len() {
        return Err(CamaraError::InsufficientClassVariation {
            partition: partition.to_string(),
        });
    }
    Ok(())
}

pub struct ModelReport {
    pub name: String,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
}

pub struct TrainingReport {
    pub split: Split,
    pub models: Vec<ModelReport>,
}

fn pick(labels: &[u8], indices: &[usize]) -> Vec<u8> {
    indices.iter().map(|&i| labels[i]).collect()
}

/// Splits, fits both models on the training partition and evaluates them on
/// the holdout. Either partition lacking one of the two classes is an
/// `InsufficientClassVariation` error.
pub fn train_and_report(
    features: &Features,
    labels: &[u8],
    settings: &ModelSettings,
) -> Result<TrainingReport> {
    if features.len() != labels.len() {
        return Err(CamaraError::Other(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }

    let split = train_test_split(features.len(), settings.test_fraction, settings.seed);
    let y_train = pick(labels, &split.train);
    let y_holdout = pick(labels, &split.holdout);
    ensure_both_classes(&y_train, "training")?;
    ensure_both_classes(&y_holdout, "holdout")?;

    let x_train = features.select(&split.train);
    let x_holdout = features.select(&split.holdout);
    tracing::info!(
        stage = "train",
        train = split.train.len(),
        holdout = split.holdout.len(),
        positives = labels.iter().filter(|&&l| l == 1).count(),
        "Dataset split"
    );

    let mut models: Vec<Box<dyn Classifier>> = vec![
        Box::new(LogisticRegression::new(settings.c)),
        Box::new(RandomForest::new(settings.n_estimators, settings.max_depth, settings.seed)),
    ];

    let mut reports = Vec::with_capacity(models.len());
    for model in models.iter_mut() {
        model.fit(&x_train, &y_train)?;
        let predictions = model.predict(&x_holdout)?;
        let confusion = ConfusionMatrix::from_predictions(&y_holdout, &predictions);
        let report = classification_report(&confusion);
        tracing::info!(
            stage = "train",
            model = model.name(),
            accuracy = report.accuracy,
            "Model evaluated"
        );
        reports.push(ModelReport {
            name: model.name().to_string(),
            confusion,
            report,
        });
    }

    Ok(TrainingReport {
        split,
        models: reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dataset(n: usize) -> (Features, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let amount = (i * 7919 % 20_000) as f64;
            rows.push(vec![(i % 12) as f64 + 1.0, 2022.0, (i % 15) as f64, amount, 0.0]);
            labels.push(u8::from(amount > 10_000.0));
        }
        let columns = ["numMes", "numAno", "numSubCota", "vlrDocumento", "numParcela"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (Features { columns, rows }, labels)
    }

    fn fast_settings() -> ModelSettings {
        ModelSettings {
            n_estimators: 10,
            ..ModelSettings::default()
        }
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let split = train_test_split(10, 0.3, 42);
        assert_eq!(split.holdout.len(), 3);
        assert_eq!(split.train.len(), 7);
        let all: HashSet<usize> = split.train.iter().chain(&split.holdout).copied().collect();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(500, 0.3, 42);
        let b = train_test_split(500, 0.3, 42);
        assert_eq!(a, b);
        let c = train_test_split(500, 0.3, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_train_and_report_partitions_are_reproducible() {
        let (x, y) = dataset(120);
        let first = train_and_report(&x, &y, &fast_settings()).unwrap();
        let second = train_and_report(&x, &y, &fast_settings()).unwrap();
        let as_set = |v: &[usize]| v.iter().copied().collect::<HashSet<_>>();
        assert_eq!(as_set(&first.split.train), as_set(&second.split.train));
        assert_eq!(as_set(&first.split.holdout), as_set(&second.split.holdout));
    }

    #[test]
    fn test_reports_both_models_on_holdout() {
        let (x, y) = dataset(200);
        let result = train_and_report(&x, &y, &fast_settings()).unwrap();
        assert_eq!(result.models.len(), 2);
        assert_eq!(result.models[0].name, "Logistic Regression");
        assert_eq!(result.models[1].name, "Random Forest");
        for m in &result.models {
            assert_eq!(m.confusion.total(), 60);
            assert!(m.report.accuracy > 0.8, "{} accuracy {}", m.name, m.report.accuracy);
        }
    }

    #[test]
    fn test_constant_label_is_insufficient_variation() {
        let (x, _) = dataset(50);
        let y = vec![0u8; 50];
        let err = train_and_report(&x, &y, &fast_settings()).err().unwrap();
        assert!(matches!(err, CamaraError::InsufficientClassVariation { .. }));
    }

    #[test]
    fn test_single_positive_leaves_a_partition_degenerate() {
        let (x, _) = dataset(20);
        let mut y = vec![0u8; 20];
        y[0] = 1;
        let err = train_and_report(&x, &y, &fast_settings()).err().unwrap();
        assert!(matches!(err, CamaraError::InsufficientClassVariation { .. }));
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let (x, _) = dataset(10);
        assert!(train_and_report(&x, &[0, 1], &fast_settings()).is_err());
    }
}
