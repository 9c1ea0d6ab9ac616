//! Talent Match - feature-engineered talent/job matching
//!
//! This library turns raw talent profiles and job postings into a fixed set
//! of eleven numeric features and scores each pair with a trained binary
//! classifier. It covers single-pair and bulk (cross product) matching plus
//! the offline pipeline that prepares data and trains the model.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod training;

// Re-export commonly used types
pub use crate::core::{Classifier, FeaturePipeline, LabelMode, MatchModel, Matcher};
pub use error::{MatchError, Result};
pub use models::{BulkMatchRequest, FeatureVector, MatchRequest, MatchResult, FEATURE_NAMES};
