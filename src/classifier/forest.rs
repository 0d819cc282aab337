use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{CamaraError, Result};
use crate::features::Features;

use super::{ensure_both_classes, from_targets, to_matrix, to_targets, Classifier};

type Model = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Bagged Gini trees (smartcore) with `sqrt(n_features)` candidates per
/// split. Predictions are the majority vote of the trees.
pub struct RandomForest {
    n_estimators: u16,
    max_depth: Option<u16>,
    seed: u64,
    model: Option<Model>,
}

impl RandomForest {
    pub fn new(n_estimators: u16, max_depth: Option<u16>, seed: u64) -> Self {
        Self {
            n_estimators,
            max_depth,
            seed,
            model: None,
        }
    }

    fn parameters(&self) -> RandomForestClassifierParameters {
        let params = RandomForestClassifierParameters::default()
            .with_n_trees(self.n_estimators)
            .with_seed(self.seed);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "Random Forest"
    }

    fn fit(&mut self, x: &Features, y: &[u8]) -> Result<()> {
        ensure_both_classes(y, "training")?;
        let model = RandomForestClassifier::fit(&to_matrix(x), &to_targets(y), self.parameters())?;
        self.model = Some(model);
        tracing::debug!(trees = self.n_estimators, seed = self.seed, "Random forest fitted");
        Ok(())
    }

    fn predict(&self, x: &Features) -> Result<Vec<u8>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| CamaraError::Other("random forest is not fitted".into()))?;
        Ok(from_targets(&model.predict(&to_matrix(x))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> (Features, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let amount = 400.0 * i as f64;
            rows.push(vec![(i % 12) as f64 + 1.0, 2022.0, (i % 5) as f64, amount, 0.0]);
            labels.push(u8::from(amount > 10_000.0));
        }
        let columns = ["numMes", "numAno", "numSubCota", "vlrDocumento", "numParcela"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (Features { columns, rows }, labels)
    }

    #[test]
    fn test_forest_learns_amount_threshold() {
        let (x, y) = dataset();
        let mut forest = RandomForest::new(25, None, 42);
        forest.fit(&x, &y).unwrap();
        let predictions = forest.predict(&x).unwrap();
        let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 57, "only {correct}/60 correct");
    }

    #[test]
    fn test_forest_is_reproducible_with_seed() {
        let (x, y) = dataset();
        let mut a = RandomForest::new(10, Some(4), 7);
        let mut b = RandomForest::new(10, Some(4), 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_parameters_carry_settings() {
        let forest = RandomForest::new(12, Some(3), 9);
        let params = forest.parameters();
        assert_eq!(params.n_trees, 12);
        assert_eq!(params.max_depth, Some(3));
        assert_eq!(params.seed, 9);
        assert_eq!(RandomForest::new(12, None, 9).parameters().max_depth, None);
    }

    #[test]
    fn test_predict_before_fit_is_an_error() {
        let (x, _) = dataset();
        assert!(RandomForest::new(5, None, 42).predict(&x).is_err());
    }

    #[test]
    fn test_single_class_is_rejected() {
        let (x, _) = dataset();
        let y = vec![1; x.len()];
        let err = RandomForest::new(5, None, 42).fit(&x, &y).unwrap_err();
        assert!(matches!(err, CamaraError::InsufficientClassVariation { .. }));
    }
}
