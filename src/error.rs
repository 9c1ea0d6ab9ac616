//! Error types for feature building, matching and training

use std::fmt;
use thiserror::Error;

/// Which side of a pair a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Talent,
    Job,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Talent => write!(f, "talent"),
            RecordKind::Job => write!(f, "job"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("{record} record is missing attribute '{attribute}'")]
    MissingAttribute {
        record: RecordKind,
        attribute: &'static str,
    },

    #[error("{record} attribute '{attribute}' must be {expected}")]
    InvalidAttribute {
        record: RecordKind,
        attribute: &'static str,
        expected: &'static str,
    },

    #[error("denominator '{attribute}' is zero")]
    DegenerateDenominator { attribute: &'static str },

    #[error("positional merge needs equal lengths (talents: {talents}, jobs: {jobs})")]
    LengthMismatch { talents: usize, jobs: usize },

    #[error("row {row} has no label")]
    MissingLabel { row: usize },

    #[error("label must be 0/1 or boolean, got {0}")]
    InvalidLabel(String),

    #[error("pipeline stage '{stage}' ran before '{requires}'")]
    StageOrder {
        stage: &'static str,
        requires: &'static str,
    },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Model loading error: {0}")]
    ModelLoad(String),

    #[error("feature matrix has {actual} columns, model expects {expected}")]
    ModelShape { expected: usize, actual: usize },

    #[error("classifier returned {actual} probabilities for {expected} rows")]
    PredictionCount { expected: usize, actual: usize },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T> = std::result::Result<T, MatchError>;
