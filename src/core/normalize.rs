//! Flattening of raw talent/job records and positional merging.
//!
//! Raw records are arbitrary JSON objects. Only the attributes the feature
//! pipeline reads are extracted; anything else is left on the original record.

use crate::error::{MatchError, RecordKind, Result};
use crate::models::{JobPosting, Language, PairRow, RawExample, TalentProfile};
use serde_json::{Map, Value};

fn as_object(record: &Value, kind: RecordKind) -> Result<&Map<String, Value>> {
    record.as_object().ok_or(MatchError::InvalidAttribute {
        record: kind,
        attribute: "(root)",
        expected: "an object",
    })
}

fn require<'a>(
    record: &'a Map<String, Value>,
    kind: RecordKind,
    attribute: &'static str,
) -> Result<&'a Value> {
    record
        .get(attribute)
        .ok_or(MatchError::MissingAttribute { record: kind, attribute })
}

fn string_attr(record: &Map<String, Value>, kind: RecordKind, attribute: &'static str) -> Result<String> {
    require(record, kind, attribute)?
        .as_str()
        .map(str::to_string)
        .ok_or(MatchError::InvalidAttribute {
            record: kind,
            attribute,
            expected: "a string",
        })
}

fn number_attr(record: &Map<String, Value>, kind: RecordKind, attribute: &'static str) -> Result<f64> {
    require(record, kind, attribute)?
        .as_f64()
        .ok_or(MatchError::InvalidAttribute {
            record: kind,
            attribute,
            expected: "a number",
        })
}

fn string_list_attr(
    record: &Map<String, Value>,
    kind: RecordKind,
    attribute: &'static str,
) -> Result<Vec<String>> {
    let invalid = MatchError::InvalidAttribute {
        record: kind,
        attribute,
        expected: "a list of strings",
    };
    let items = require(record, kind, attribute)?.as_array().ok_or(invalid)?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or(MatchError::InvalidAttribute {
                record: kind,
                attribute,
                expected: "a list of strings",
            })
        })
        .collect()
}

fn languages_attr(record: &Map<String, Value>, kind: RecordKind) -> Result<Vec<Language>> {
    let invalid = || MatchError::InvalidAttribute {
        record: kind,
        attribute: "languages",
        expected: "a list of {title, rating} objects",
    };
    let items = require(record, kind, "languages")?.as_array().ok_or_else(invalid)?;

    items
        .iter()
        .map(|item| {
            let entry = item.as_object().ok_or_else(invalid)?;
            let title = entry.get("title").and_then(Value::as_str).ok_or_else(invalid)?;
            let rating = entry.get("rating").and_then(Value::as_str).ok_or_else(invalid)?;
            Ok(Language::new(title, rating))
        })
        .collect()
}

/// Extract the typed talent attributes from a raw record
pub fn flatten_talent(record: &Value) -> Result<TalentProfile> {
    let kind = RecordKind::Talent;
    let record = as_object(record, kind)?;

    Ok(TalentProfile {
        job_roles: string_list_attr(record, kind, "job_roles")?,
        seniority: string_attr(record, kind, "seniority")?,
        degree: string_attr(record, kind, "degree")?,
        salary_expectation: number_attr(record, kind, "salary_expectation")?,
        languages: languages_attr(record, kind)?,
    })
}

/// Extract the typed job attributes from a raw record
pub fn flatten_job(record: &Value) -> Result<JobPosting> {
    let kind = RecordKind::Job;
    let record = as_object(record, kind)?;

    Ok(JobPosting {
        job_roles: string_list_attr(record, kind, "job_roles")?,
        seniorities: string_list_attr(record, kind, "seniorities")?,
        min_degree: string_attr(record, kind, "min_degree")?,
        max_salary: number_attr(record, kind, "max_salary")?,
        languages: languages_attr(record, kind)?,
    })
}

pub fn flatten_talents(records: &[Value]) -> Result<Vec<TalentProfile>> {
    records.iter().map(flatten_talent).collect()
}

pub fn flatten_jobs(records: &[Value]) -> Result<Vec<JobPosting>> {
    records.iter().map(flatten_job).collect()
}

/// Pair row `i` of talents with row `i` of jobs.
///
/// Callers must hand in sequences that are already paired; unequal lengths
/// are rejected rather than truncated.
pub fn merge(talents: Vec<TalentProfile>, jobs: Vec<JobPosting>) -> Result<Vec<PairRow>> {
    if talents.len() != jobs.len() {
        return Err(MatchError::LengthMismatch {
            talents: talents.len(),
            jobs: jobs.len(),
        });
    }

    Ok(talents
        .into_iter()
        .zip(jobs)
        .map(|(talent, job)| PairRow { talent, job, label: None })
        .collect())
}

/// Flatten both tables and merge them by position
pub fn normalize_and_merge(talents: &[Value], jobs: &[Value]) -> Result<Vec<PairRow>> {
    if talents.len() != jobs.len() {
        return Err(MatchError::LengthMismatch {
            talents: talents.len(),
            jobs: jobs.len(),
        });
    }
    merge(flatten_talents(talents)?, flatten_jobs(jobs)?)
}

/// Normalize raw dataset examples, carrying each example's label along
pub fn normalize_examples(examples: &[RawExample]) -> Result<Vec<PairRow>> {
    examples
        .iter()
        .map(|example| {
            Ok(PairRow {
                talent: flatten_talent(&example.talent)?,
                job: flatten_job(&example.job)?,
                label: example.label.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn talent() -> Value {
        json!({
            "job_roles": ["a", "b"],
            "seniority": "mid",
            "degree": "bachelor",
            "salary_expectation": 50000,
            "languages": [{"title": "en", "rating": "B2"}],
            "name": "ignored"
        })
    }

    fn job() -> Value {
        json!({
            "job_roles": ["a", "c"],
            "seniorities": ["mid", "senior"],
            "min_degree": "bachelor",
            "max_salary": 60000,
            "languages": [{"title": "en", "rating": "B1"}]
        })
    }

    #[test]
    fn test_flatten_talent() {
        let profile = flatten_talent(&talent()).unwrap();
        assert_eq!(profile.job_roles, vec!["a", "b"]);
        assert_eq!(profile.salary_expectation, 50000.0);
        assert_eq!(profile.languages, vec![Language::new("en", "B2")]);
    }

    #[test]
    fn test_flatten_job() {
        let posting = flatten_job(&job()).unwrap();
        assert_eq!(posting.seniorities, vec!["mid", "senior"]);
        assert_eq!(posting.max_salary, 60000.0);
    }

    #[test]
    fn test_missing_attribute() {
        let mut record = talent();
        record.as_object_mut().unwrap().remove("seniority");
        let err = flatten_talent(&record).unwrap_err();
        assert!(matches!(
            err,
            MatchError::MissingAttribute { record: RecordKind::Talent, attribute: "seniority" }
        ));
    }

    #[test]
    fn test_invalid_attribute_type() {
        let mut record = job();
        record["max_salary"] = json!("lots");
        let err = flatten_job(&record).unwrap_err();
        assert!(matches!(
            err,
            MatchError::InvalidAttribute { record: RecordKind::Job, attribute: "max_salary", .. }
        ));
    }

    #[test]
    fn test_malformed_language_entry() {
        let mut record = talent();
        record["languages"] = json!([{"title": "en"}]);
        assert!(flatten_talent(&record).is_err());
    }

    #[test]
    fn test_non_object_record() {
        assert!(flatten_job(&json!(["not", "a", "record"])).is_err());
    }

    #[test]
    fn test_positional_merge() {
        let mut second = talent();
        second["seniority"] = json!("senior");
        let rows = normalize_and_merge(&[talent(), second], &[job(), job()]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].talent.seniority, "mid");
        assert_eq!(rows[1].talent.seniority, "senior");
        assert!(rows.iter().all(|r| r.label.is_none()));
    }

    #[test]
    fn test_merge_length_mismatch() {
        let err = normalize_and_merge(&[talent()], &[job(), job()]).unwrap_err();
        assert!(matches!(err, MatchError::LengthMismatch { talents: 1, jobs: 2 }));
    }

    #[test]
    fn test_normalize_examples_keeps_labels() {
        let examples = vec![RawExample {
            talent: talent(),
            job: job(),
            label: Some(json!(true)),
        }];
        let rows = normalize_examples(&examples).unwrap();
        assert_eq!(rows[0].label, Some(json!(true)));
    }
}
