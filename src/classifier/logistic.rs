use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{
    LogisticRegression as LinearModel, LogisticRegressionParameters,
};

use crate::error::{CamaraError, Result};
use crate::features::Features;

use super::{ensure_both_classes, from_targets, to_matrix, to_targets, Classifier};

type Model = LinearModel<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// L2-regularized logistic regression (smartcore, L-BFGS).
///
/// Inputs are standardized with the training mean and deviation before
/// fitting, so raw feature ranges (years next to amounts) stay well
/// conditioned.
pub struct LogisticRegression {
    /// Inverse regularization strength.
    c: f64,
    mean: Vec<f64>,
    scale: Vec<f64>,
    model: Option<Model>,
}

impl LogisticRegression {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            mean: Vec::new(),
            scale: Vec::new(),
            model: None,
        }
    }

    fn standardize(&self, x: &Features) -> Features {
        let rows = x
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect()
            })
            .collect();
        Features {
            columns: x.columns.clone(),
            rows,
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "Logistic Regression"
    }

    fn fit(&mut self, x: &Features, y: &[u8]) -> Result<()> {
        ensure_both_classes(y, "training")?;
        let n = x.len() as f64;
        let d = x.n_features();

        self.mean = (0..d)
            .map(|j| x.rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();
        self.scale = (0..d)
            .map(|j| {
                let var = x.rows.iter().map(|r| (r[j] - self.mean[j]).powi(2)).sum::<f64>() / n;
                if var > 0.0 { var.sqrt() } else { 1.0 }
            })
            .collect();

        let params = LogisticRegressionParameters::default().with_alpha(1.0 / self.c);
        let model = LinearModel::fit(&to_matrix(&self.standardize(x)), &to_targets(y), params)?;
        self.model = Some(model);
        tracing::debug!(rows = x.len(), features = d, "Logistic regression fitted");
        Ok(())
    }

    fn predict(&self, x: &Features) -> Result<Vec<u8>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| CamaraError::Other("logistic regression is not fitted".into()))?;
        Ok(from_targets(&model.predict(&to_matrix(&self.standardize(x)))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(rows: Vec<Vec<f64>>) -> Features {
        Features {
            columns: vec!["numAno".into(), "vlrDocumento".into()],
            rows,
        }
    }

    #[test]
    fn test_separates_by_amount_on_raw_scale() {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let amount = 500.0 * i as f64;
            rows.push(vec![2022.0, amount]);
            labels.push(u8::from(amount > 10_000.0));
        }
        let x = features(rows);
        let mut model = LogisticRegression::new(1.0);
        model.fit(&x, &labels).unwrap();

        let unseen = features(vec![vec![2022.0, 1_000.0], vec![2022.0, 19_000.0]]);
        assert_eq!(model.predict(&unseen).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let x = features(vec![vec![2022.0, 1.0], vec![2022.0, 2.0]]);
        let err = LogisticRegression::new(1.0).fit(&x, &[0, 0]).unwrap_err();
        assert!(matches!(err, CamaraError::InsufficientClassVariation { .. }));
    }

    #[test]
    fn test_predict_before_fit_is_an_error() {
        let x = features(vec![vec![2022.0, 1.0]]);
        assert!(LogisticRegression::new(1.0).predict(&x).is_err());
    }

    #[test]
    fn test_constant_feature_does_not_divide_by_zero() {
        let x = features(vec![vec![2022.0, 1.0], vec![2022.0, 3.0]]);
        let mut model = LogisticRegression::new(1.0);
        model.fit(&x, &[0, 1]).unwrap();
        assert_eq!(model.scale[0], 1.0);
        assert!(model.standardize(&x).rows.iter().flatten().all(|v| v.is_finite()));
    }
}
