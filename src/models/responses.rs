use serde::Serialize;
use serde_json::Value;

/// Scored talent/job pair.
///
/// Borrows the caller's original records so a bulk result does not clone
/// every talent and job once per pairing.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult<'a> {
    pub talent: &'a Value,
    pub job: &'a Value,
    pub label: u8,
    pub score: f64,
}

/// Summary of an offline training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub model_id: uuid::Uuid,
    pub train_rows: usize,
    pub test_rows: usize,
    /// `[[tn, fp], [fn, tp]]` on the held-out split
    pub confusion_matrix: [[usize; 2]; 2],
    pub test_roc_auc: Option<f64>,
    pub cv_precision: Vec<f64>,
    pub cv_recall: Vec<f64>,
    pub full_rows: usize,
}
