// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{FeatureVector, JobPosting, Language, PairRow, TalentProfile, FEATURE_NAMES, LABEL_NAME};
pub use requests::{BulkMatchRequest, MatchRequest, RawExample};
pub use responses::{MatchResult, TrainingReport};
