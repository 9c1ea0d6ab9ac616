// Offline training exports
pub mod metrics;
pub mod split;
pub mod trainer;

pub use metrics::{classification_report, roc_auc, ClassScores, ConfusionMatrix};
pub use split::{stratified_k_fold, train_test_split, Split};
pub use trainer::Trainer;
