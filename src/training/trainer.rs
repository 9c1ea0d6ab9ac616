use crate::config::TrainingSettings;
use crate::core::classifier::{Classifier, LogisticParams, MatchModel};
use crate::core::pipeline::FeatureTable;
use crate::error::{MatchError, Result};
use crate::models::TrainingReport;
use crate::training::metrics::{classification_report, roc_auc, ConfusionMatrix};
use crate::training::split::{select_labels, select_rows, stratified_k_fold, train_test_split};
use ndarray::{Array1, Array2};
use tracing::info;

/// Offline trainer: fits the scaler + logistic regression pipeline,
/// evaluates it, then refits on all rows for the artifact
#[derive(Debug, Clone)]
pub struct Trainer {
    params: LogisticParams,
    threshold: f64,
    test_size: f64,
    seed: u64,
    cv_folds: usize,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::from_settings(&TrainingSettings::default())
    }
}

fn to_labels(y: &Array1<f64>) -> Vec<u8> {
    y.iter().map(|&v| v as u8).collect()
}

impl Trainer {
    pub fn from_settings(settings: &TrainingSettings) -> Self {
        Self {
            params: LogisticParams {
                c: settings.c,
                max_iter: settings.max_iter,
                tol: settings.tol,
            },
            threshold: settings.threshold,
            test_size: settings.test_size,
            seed: settings.seed,
            cv_folds: settings.cv_folds,
        }
    }

    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<MatchModel> {
        let model = MatchModel::fit(x, y, &self.params, self.threshold)?;
        info!("Model training completed on {} rows", x.nrows());
        Ok(model)
    }

    /// Cross-validated precision and recall, one entry per fold
    pub fn cross_validate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(Vec<f64>, Vec<f64>)> {
        let folds = stratified_k_fold(&to_labels(y), self.cv_folds)?;
        let mut precision = Vec::with_capacity(folds.len());
        let mut recall = Vec::with_capacity(folds.len());

        for fold in &folds {
            let model = MatchModel::fit(
                &select_rows(x, &fold.train),
                &select_labels(y, &fold.train),
                &self.params,
                self.threshold,
            )?;
            let predicted = model.predict(&select_rows(x, &fold.test))?.to_vec();
            let cm = ConfusionMatrix::from_labels(&to_labels(&select_labels(y, &fold.test)), &predicted);
            precision.push(cm.precision());
            recall.push(cm.recall());
        }

        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        info!("Cross-Validation Precision Scores: {:?}", precision);
        info!("Cross-Validation Recall Scores: {:?}", recall);
        info!("Average Precision: {:.4}", mean(&precision));
        info!("Average Recall: {:.4}", mean(&recall));

        Ok((precision, recall))
    }

    /// Confusion matrix and ROC-AUC on held-out rows
    pub fn evaluate(
        &self,
        model: &MatchModel,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<(ConfusionMatrix, Option<f64>)> {
        let proba = model.predict_proba(x_test)?;
        let predicted: Vec<u8> = proba.iter().map(|&p| u8::from(p > model.threshold())).collect();
        let truth = to_labels(y_test);

        let sample: Vec<f64> = proba.iter().take(20).copied().collect();
        info!("probabilities sample {:?}", sample);

        let cm = ConfusionMatrix::from_labels(&truth, &predicted);
        info!("\n{}", classification_report(&cm));
        info!("Confusion Matrix:\n{}", cm);

        let auc = roc_auc(&truth, &proba.to_vec());
        match auc {
            Some(auc) => info!("ROC-AUC Score: {:.4}", auc),
            None => tracing::warn!("ROC-AUC undefined: test split holds a single class"),
        }

        Ok((cm, auc))
    }

    /// Split, fit, evaluate, cross-validate, then refit on every row.
    ///
    /// Returns the full-data model (the one to persist) and a report of the
    /// evaluation on the held-out split.
    pub fn run(&self, table: &FeatureTable) -> Result<(MatchModel, TrainingReport)> {
        let y = table
            .label_vector()
            .ok_or_else(|| MatchError::Training("feature table has no labels".to_string()))?;
        let x = table.to_matrix();
        info!("Training data shape: ({}, {})", x.nrows(), x.ncols());

        let split = train_test_split(x.nrows(), self.test_size, self.seed)?;
        let (x_train, y_train) = (select_rows(&x, &split.train), select_labels(&y, &split.train));
        let (x_test, y_test) = (select_rows(&x, &split.test), select_labels(&y, &split.test));

        let model = self.fit(&x_train, &y_train)?;
        let (cm, auc) = self.evaluate(&model, &x_test, &y_test)?;
        let (cv_precision, cv_recall) = self.cross_validate(&x_train, &y_train)?;

        let full_model = self.fit(&x, &y)?;

        let report = TrainingReport {
            model_id: full_model.id,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            confusion_matrix: cm.as_array(),
            test_roc_auc: auc,
            cv_precision,
            cv_recall,
            full_rows: x.nrows(),
        };

        Ok((full_model, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureVector;

    /// Rows where a match is determined by the skill ratio and seniority
    fn synthetic_table(n: usize) -> FeatureTable {
        let mut features = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let ratio = (i % 10) as f64 / 10.0;
            let seniority = (i % 3 != 0) as u8;
            features.push(FeatureVector {
                skill_match_ratio: ratio,
                seniority_match: seniority,
                skill_diff_talent: i % 4,
                skill_diff_job: (10 - i % 10) / 3,
                salary_expectation_delta: 0.1,
                salary_expectation_over_budget: 0,
                degree_level_matched: 1,
                degree_level_diff: 0,
                language_match_ratio: 1.0,
                required_languages: 1,
                language_rating_match_ratio: 1.0,
            });
            labels.push(u8::from(ratio >= 0.5 && seniority == 1));
        }
        FeatureTable {
            features,
            labels: Some(labels),
        }
    }

    #[test]
    fn test_run_produces_report_and_full_model() {
        let table = synthetic_table(100);
        let (model, report) = Trainer::default().run(&table).unwrap();

        assert_eq!(report.train_rows, 80);
        assert_eq!(report.test_rows, 20);
        assert_eq!(report.full_rows, 100);
        assert_eq!(report.model_id, model.id);
        assert_eq!(report.cv_precision.len(), 5);
        assert_eq!(report.confusion_matrix.iter().flatten().sum::<usize>(), 20);
        assert!(report.test_roc_auc.map_or(true, |auc| auc > 0.8));
    }

    #[test]
    fn test_run_requires_labels() {
        let mut table = synthetic_table(20);
        table.labels = None;
        assert!(matches!(Trainer::default().run(&table), Err(MatchError::Training(_))));
    }

    #[test]
    fn test_fitted_model_ranks_positives_higher() {
        let table = synthetic_table(60);
        let trainer = Trainer::default();
        let model = trainer
            .fit(&table.to_matrix(), &table.label_vector().unwrap())
            .unwrap();
        let proba = model.predict_proba(&table.to_matrix()).unwrap();

        let labels = table.labels.unwrap();
        let auc = roc_auc(&labels, &proba.to_vec()).unwrap();
        assert!(auc > 0.8);
    }
}
