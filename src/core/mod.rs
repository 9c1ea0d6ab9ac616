// Core algorithm exports
pub mod classifier;
pub mod features;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod scales;

pub use classifier::{Classifier, LogisticParams, LogisticRegression, MatchModel, StandardScaler};
pub use features::{SalaryPolicy, ZeroBudget};
pub use matcher::{CrossProduct, Matcher, DEFAULT_BATCH_SIZE};
pub use normalize::{flatten_job, flatten_talent, merge, normalize_and_merge, normalize_examples};
pub use pipeline::{FeaturePipeline, FeatureTable, LabelMode, PairColumns, Stage};
pub use scales::{CefrScale, DegreeScale};
