//! Binary classifier used to score pairs: a standard scaler feeding an
//! L2-regularized logistic regression.
//!
//! - Scaler: z = (x - mean) / std, fitted with `linfa-preprocessing`, with
//!   std = 1 for constant columns
//! - Model: p(match) = sigmoid(w·z + b), fitted with `linfa-logistic` and
//!   persisted as plain weights

use crate::error::{MatchError, Result};
use crate::models::FEATURE_NAMES;
use chrono::{DateTime, Utc};
use linfa::traits::Fit;
use linfa::{Dataset, DatasetBase};
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything that can turn a feature matrix into match probabilities.
///
/// Implementations are read-only once built, so a single instance can be
/// shared by concurrent prediction calls.
pub trait Classifier: Send + Sync {
    /// Number of feature columns the classifier expects
    fn n_features(&self) -> usize;

    /// Probability of the positive class for each row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Probability above which a row is labeled 1
    fn threshold(&self) -> f64 {
        0.5
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        let threshold = self.threshold();
        Ok(self.predict_proba(x)?.mapv(|p| u8::from(p > threshold)))
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn check_shape(x: &Array2<f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(MatchError::ModelShape {
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}

/// Per-column standardization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(MatchError::Training("cannot fit scaler on zero rows".to_string()));
        }
        let fitted = LinearScaler::standard()
            .fit(&DatasetBase::from(x.to_owned()))
            .map_err(|e| MatchError::Training(format!("standard scaler: {}", e)))?;

        // linfa stores the multiplicative factor 1/std; keep the std itself
        let scale = fitted
            .scales()
            .mapv(|f| if f.is_finite() && f > 0.0 { 1.0 / f } else { 1.0 })
            .mapv(|std| if std > f64::EPSILON { std } else { 1.0 });
        Ok(Self {
            mean: fitted.offsets().to_owned(),
            scale,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_shape(x, self.n_features())?;
        Ok((x - &self.mean) / &self.scale)
    }
}

/// Hyperparameters for `LogisticRegression::fit`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iter: u64,
    /// Solver stops once the gradient norm drops below this
    pub tol: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-6,
        }
    }
}

/// Weights of a fitted logistic regression, oriented so that the decision
/// function is positive for matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    intercept: f64,
}

impl LogisticRegression {
    /// Fit with linfa's L-BFGS solver on the summed log-loss plus `||w||² / (2·C)`
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: &LogisticParams) -> Result<Self> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(MatchError::Training(format!(
                "{} feature rows for {} labels",
                n,
                y.len()
            )));
        }

        let targets: Array1<bool> = y.mapv(|v| v == 1.0);
        let dataset = Dataset::new(x.to_owned(), targets);

        let fitted = linfa_logistic::LogisticRegression::default()
            .alpha(1.0 / params.c)
            .max_iterations(params.max_iter)
            .gradient_tolerance(params.tol)
            .fit(&dataset)
            .map_err(|e| MatchError::Training(format!("logistic regression: {}", e)))?;

        // linfa scores its own positive class; flip when that is "no match"
        let (weights, intercept) = if fitted.labels().pos.class {
            (fitted.params().to_owned(), fitted.intercept())
        } else {
            (fitted.params().mapv(|w| -w), -fitted.intercept())
        };
        tracing::debug!("Logistic regression fitted on {} rows", n);

        Ok(Self { weights, intercept })
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// w·x + b, summed left to right so a row scores identically whether it
    /// is scored alone or inside a batch
    #[inline]
    fn decision(&self, row: ArrayView1<f64>) -> f64 {
        row.iter()
            .zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_shape(x, self.n_features())?;
        Ok(x.outer_iter().map(|row| sigmoid(self.decision(row))).collect())
    }
}

/// Fitted scaler + classifier, the artifact the matcher loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchModel {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub threshold: f64,
    scaler: StandardScaler,
    classifier: LogisticRegression,
}

impl MatchModel {
    /// Fit on a labeled feature matrix; both classes must be present
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<f64>,
        params: &LogisticParams,
        threshold: f64,
    ) -> Result<Self> {
        let positives = y.iter().filter(|&&v| v == 1.0).count();
        if positives == 0 || positives == y.len() {
            return Err(MatchError::Training(
                "training labels must contain both classes".to_string(),
            ));
        }

        let scaler = StandardScaler::fit(x)?;
        let classifier = LogisticRegression::fit(&scaler.transform(x)?, y, params)?;

        Ok(Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            threshold,
            scaler,
            classifier,
        })
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }
}

impl Classifier for MatchModel {
    fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.classifier.predict_proba(&self.scaler.transform(x)?)
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 1.0],
            [0.1, 1.2],
            [0.2, 0.9],
            [0.3, 1.1],
            [1.0, 0.0],
            [0.9, 0.2],
            [1.1, 0.1],
            [0.8, 0.3],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(!sigmoid(-800.0).is_nan());
    }

    #[test]
    fn test_scaler_standardizes_columns() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let z = scaler.transform(&x).unwrap();
        assert_eq!(z, array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_fit_separates_classes() {
        let (x, y) = separable();
        let model = MatchModel::fit(&x, &y, &LogisticParams::default(), 0.5).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        for (p, label) in proba.iter().zip(y.iter()) {
            if *label == 1.0 {
                assert!(*p > 0.5);
            } else {
                assert!(*p < 0.5);
            }
        }
        assert_eq!(model.predict(&x).unwrap(), y.mapv(|v| v as u8));
    }

    #[test]
    fn test_fit_rejects_single_class() {
        let (x, _) = separable();
        let y = Array1::zeros(x.nrows());
        assert!(matches!(
            MatchModel::fit(&x, &y, &LogisticParams::default(), 0.5),
            Err(MatchError::Training(_))
        ));
    }

    #[test]
    fn test_predict_checks_width() {
        let (x, y) = separable();
        let model = MatchModel::fit(&x, &y, &LogisticParams::default(), 0.5).unwrap();
        let wrong = Array2::zeros((1, 3));
        assert!(matches!(
            model.predict_proba(&wrong),
            Err(MatchError::ModelShape { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_row_scores_match_batch_scores() {
        let (x, y) = separable();
        let model = MatchModel::fit(&x, &y, &LogisticParams::default(), 0.5).unwrap();
        let batch = model.predict_proba(&x).unwrap();

        for (i, row) in x.outer_iter().enumerate() {
            let single = row.to_owned().insert_axis(Axis(0));
            let p = model.predict_proba(&single).unwrap();
            assert_eq!(p[0].to_bits(), batch[i].to_bits());
        }
    }
}
