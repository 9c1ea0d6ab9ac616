use serde::{Deserialize, Serialize};

/// A language entry with its CEFR proficiency label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub title: String,
    pub rating: String,
}

impl Language {
    pub fn new(title: impl Into<String>, rating: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rating: rating.into(),
        }
    }
}

/// Flattened talent attributes, serialized as `talent_`-prefixed columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentProfile {
    #[serde(rename = "talent_job_roles")]
    pub job_roles: Vec<String>,
    #[serde(rename = "talent_seniority")]
    pub seniority: String,
    #[serde(rename = "talent_degree")]
    pub degree: String,
    #[serde(rename = "talent_salary_expectation")]
    pub salary_expectation: f64,
    #[serde(rename = "talent_languages")]
    pub languages: Vec<Language>,
}

/// Flattened job attributes, serialized as `job_`-prefixed columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(rename = "job_job_roles")]
    pub job_roles: Vec<String>,
    #[serde(rename = "job_seniorities")]
    pub seniorities: Vec<String>,
    #[serde(rename = "job_min_degree")]
    pub min_degree: String,
    #[serde(rename = "job_max_salary")]
    pub max_salary: f64,
    #[serde(rename = "job_languages")]
    pub languages: Vec<Language>,
}

/// One merged row: a talent and a job aligned by position, plus the raw label
/// when the row comes from a labeled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    #[serde(flatten)]
    pub talent: TalentProfile,
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<serde_json::Value>,
}

/// Column names of the feature matrix, in model input order
pub const FEATURE_NAMES: [&str; FeatureVector::LEN] = [
    "skill_match_ratio",
    "seniority_match",
    "skill_diff_talent",
    "skill_diff_job",
    "salary_expectation_delta",
    "salary_expectation_over_budget",
    "degree_level_matched",
    "degree_level_diff",
    "language_match_ratio",
    "required_languages",
    "language_rating_match_ratio",
];

pub const LABEL_NAME: &str = "label";

/// Fixed-order numeric summary of a pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub skill_match_ratio: f64,
    pub seniority_match: u8,
    pub skill_diff_talent: usize,
    pub skill_diff_job: usize,
    pub salary_expectation_delta: f64,
    pub salary_expectation_over_budget: u8,
    pub degree_level_matched: u8,
    pub degree_level_diff: i32,
    pub language_match_ratio: f64,
    pub required_languages: usize,
    pub language_rating_match_ratio: f64,
}

impl FeatureVector {
    pub const LEN: usize = 11;

    /// Values laid out in `FEATURE_NAMES` order
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.skill_match_ratio,
            self.seniority_match as f64,
            self.skill_diff_talent as f64,
            self.skill_diff_job as f64,
            self.salary_expectation_delta,
            self.salary_expectation_over_budget as f64,
            self.degree_level_matched as f64,
            self.degree_level_diff as f64,
            self.language_match_ratio,
            self.required_languages as f64,
            self.language_rating_match_ratio,
        ]
    }

    /// Inverse of `to_array`. Count columns must hold non-negative integers,
    /// flag columns 0 or 1 and `degree_level_diff` an integer.
    pub fn try_from_array(values: [f64; Self::LEN]) -> Result<Self, String> {
        Ok(Self {
            skill_match_ratio: values[0],
            seniority_match: flag(FEATURE_NAMES[1], values[1])?,
            skill_diff_talent: count(FEATURE_NAMES[2], values[2])?,
            skill_diff_job: count(FEATURE_NAMES[3], values[3])?,
            salary_expectation_delta: values[4],
            salary_expectation_over_budget: flag(FEATURE_NAMES[5], values[5])?,
            degree_level_matched: flag(FEATURE_NAMES[6], values[6])?,
            degree_level_diff: integer(FEATURE_NAMES[7], values[7])?,
            language_match_ratio: values[8],
            required_languages: count(FEATURE_NAMES[9], values[9])?,
            language_rating_match_ratio: values[10],
        })
    }
}

fn flag(name: &str, value: f64) -> Result<u8, String> {
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(format!("{} must be 0 or 1, got {}", name, value))
    }
}

fn count(name: &str, value: f64) -> Result<usize, String> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(format!("{} must be a non-negative integer, got {}", name, value))
    }
}

fn integer(name: &str, value: f64) -> Result<i32, String> {
    if value.is_finite() && value.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&value) {
        Ok(value as i32)
    } else {
        Err(format!("{} must be an integer, got {}", name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_row_serializes_flat_prefixed_columns() {
        let row = PairRow {
            talent: TalentProfile {
                job_roles: vec!["a".to_string()],
                seniority: "mid".to_string(),
                degree: "bachelor".to_string(),
                salary_expectation: 50000.0,
                languages: vec![Language::new("en", "B2")],
            },
            job: JobPosting {
                job_roles: vec!["a".to_string()],
                seniorities: vec!["mid".to_string()],
                min_degree: "none".to_string(),
                max_salary: 60000.0,
                languages: vec![],
            },
            label: Some(serde_json::json!(true)),
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["talent_seniority"], "mid");
        assert_eq!(value["job_max_salary"], 60000.0);
        assert_eq!(value["label"], true);

        let back: PairRow = serde_json::from_value(value).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_feature_array_follows_feature_names() {
        let features = FeatureVector {
            skill_match_ratio: 0.5,
            seniority_match: 1,
            skill_diff_talent: 2,
            skill_diff_job: 3,
            salary_expectation_delta: -0.25,
            salary_expectation_over_budget: 1,
            degree_level_matched: 0,
            degree_level_diff: -2,
            language_match_ratio: 1.0,
            required_languages: 4,
            language_rating_match_ratio: 0.75,
        };

        let values = features.to_array();
        let idx = |name: &str| FEATURE_NAMES.iter().position(|n| *n == name).unwrap();
        assert_eq!(values[idx("skill_diff_job")], 3.0);
        assert_eq!(values[idx("degree_level_diff")], -2.0);
        assert_eq!(values[idx("required_languages")], 4.0);
        assert_eq!(values[idx("language_rating_match_ratio")], 0.75);
        assert_eq!(FeatureVector::try_from_array(values).unwrap(), features);
    }

    #[test]
    fn test_feature_array_rejects_non_integral_columns() {
        let valid = [0.5, 1.0, 2.0, 0.0, 0.1, 0.0, 1.0, -1.0, 1.0, 1.0, 1.0];
        assert!(FeatureVector::try_from_array(valid).is_ok());

        for (column, bad) in [(2, -3.0), (3, 1.5), (9, f64::NAN), (1, 2.0), (6, 0.5), (7, 0.25)] {
            let mut values = valid;
            values[column] = bad;
            let err = FeatureVector::try_from_array(values).unwrap_err();
            assert!(err.starts_with(FEATURE_NAMES[column]), "{}", err);
        }
    }
}
