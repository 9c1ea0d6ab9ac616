use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// One record of the raw dataset: a talent, a job and (optionally) the
/// ground-truth label for the pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExample {
    pub talent: Value,
    pub job: Value,
    #[serde(default)]
    pub label: Option<Value>,
}

/// Request to score a single talent/job pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub talent: Value,
    pub job: Value,
}

/// Request to score every talent against every job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkMatchRequest {
    #[validate(length(min = 1))]
    pub talents: Vec<Value>,
    #[validate(length(min = 1))]
    pub jobs: Vec<Value>,
}
