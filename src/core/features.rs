//! Pure per-pair feature computations.
//!
//! Every function here is deterministic and depends only on the attributes
//! passed in. Empty requirement collections degrade to a ratio of 0 instead
//! of failing.

use crate::core::scales::CefrScale;
use crate::error::{MatchError, Result};
use crate::models::Language;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Fraction of the job's distinct entries that the talent also has.
///
/// Used for role overlap and skill overlap alike.
#[inline]
pub fn match_ratio(talent: &[String], job: &[String]) -> f64 {
    let job_set: HashSet<&str> = job.iter().map(String::as_str).collect();
    if job_set.is_empty() {
        return 0.0;
    }
    let talent_set: HashSet<&str> = talent.iter().map(String::as_str).collect();
    talent_set.intersection(&job_set).count() as f64 / job_set.len() as f64
}

/// 1 when the talent's seniority is one the job accepts
#[inline]
pub fn seniority_hit(seniority: &str, accepted: &[String]) -> u8 {
    u8::from(accepted.iter().any(|s| s == seniority))
}

/// Asymmetric set differences: (|talent - job|, |job - talent|)
pub fn skill_diff(talent: &[String], job: &[String]) -> (usize, usize) {
    let talent_set: HashSet<&str> = talent.iter().map(String::as_str).collect();
    let job_set: HashSet<&str> = job.iter().map(String::as_str).collect();
    (
        talent_set.difference(&job_set).count(),
        job_set.difference(&talent_set).count(),
    )
}

/// Signed gap between scaled degrees
#[inline]
pub fn degree_level_diff(talent_scaled: i32, job_scaled: i32) -> i32 {
    talent_scaled - job_scaled
}

/// 1 when the talent's scaled degree reaches the job's minimum
#[inline]
pub fn degree_level_matched(talent_scaled: i32, job_scaled: i32) -> u8 {
    u8::from(talent_scaled >= job_scaled)
}

/// What to do when a job's salary budget is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroBudget {
    /// Raise `DegenerateDenominator`
    #[default]
    Fail,
    /// Substitute `SalaryPolicy::sentinel` for the delta
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryPolicy {
    #[serde(default)]
    pub zero_budget: ZeroBudget,
    #[serde(default = "default_sentinel")]
    pub sentinel: f64,
}

fn default_sentinel() -> f64 { -1.0 }

impl Default for SalaryPolicy {
    fn default() -> Self {
        Self {
            zero_budget: ZeroBudget::Fail,
            sentinel: default_sentinel(),
        }
    }
}

/// Relative headroom `(max - expectation) / max` and the over-budget flag
pub fn salary_expectation(
    expectation: f64,
    max_salary: f64,
    policy: &SalaryPolicy,
) -> Result<(f64, u8)> {
    let delta = if max_salary == 0.0 {
        match policy.zero_budget {
            ZeroBudget::Fail => {
                return Err(MatchError::DegenerateDenominator {
                    attribute: "max_salary",
                })
            }
            ZeroBudget::Sentinel => policy.sentinel,
        }
    } else {
        (max_salary - expectation) / max_salary
    };

    Ok((delta, u8::from(delta < 0.0)))
}

/// Fraction of the job's distinct language titles the talent lists
pub fn language_match_ratio(talent: &[Language], job: &[Language]) -> f64 {
    let job_titles: HashSet<&str> = job.iter().map(|l| l.title.as_str()).collect();
    if job_titles.is_empty() {
        return 0.0;
    }
    let talent_titles: HashSet<&str> = talent.iter().map(|l| l.title.as_str()).collect();
    talent_titles.intersection(&job_titles).count() as f64 / job_titles.len() as f64
}

#[inline]
pub fn required_languages(job: &[Language]) -> usize {
    job.len()
}

/// Fraction of the job's language requirements the talent meets or exceeds.
///
/// A language the talent does not list is assessed at the scale's missing
/// rating. Unknown labels on either side rank as 0.
pub fn rating_match_ratio(talent: &[Language], job: &[Language], cefr: &CefrScale) -> f64 {
    if job.is_empty() {
        return 0.0;
    }

    let talent_ratings: HashMap<&str, &str> = talent
        .iter()
        .map(|l| (l.title.as_str(), l.rating.as_str()))
        .collect();

    let matched = job
        .iter()
        .filter(|required| {
            let rating = talent_ratings
                .get(required.title.as_str())
                .copied()
                .unwrap_or(cefr.missing_rating());
            cefr.level(rating) >= cefr.level(&required.rating)
        })
        .count();

    matched as f64 / job.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_match_ratio() {
        assert_eq!(match_ratio(&strings(&["a", "b"]), &strings(&["a", "c"])), 0.5);
        assert_eq!(match_ratio(&strings(&["a"]), &strings(&["a"])), 1.0);
        assert_eq!(match_ratio(&strings(&[]), &strings(&["a"])), 0.0);
    }

    #[test]
    fn test_match_ratio_empty_job_is_zero() {
        assert_eq!(match_ratio(&strings(&["a", "b"]), &[]), 0.0);
    }

    #[test]
    fn test_match_ratio_uses_distinct_entries() {
        // Duplicates on the job side do not inflate the denominator
        let ratio = match_ratio(&strings(&["a"]), &strings(&["a", "a", "b"]));
        assert_eq!(ratio, 0.5);
    }

    #[test]
    fn test_seniority_hit() {
        let accepted = strings(&["mid", "senior"]);
        assert_eq!(seniority_hit("mid", &accepted), 1);
        assert_eq!(seniority_hit("junior", &accepted), 0);
        assert_eq!(seniority_hit("mid", &[]), 0);
    }

    #[test]
    fn test_skill_diff_partitions_talent_set() {
        let talent = strings(&["a", "b", "c", "c"]);
        let job = strings(&["b", "d"]);
        let (only_talent, only_job) = skill_diff(&talent, &job);
        assert_eq!((only_talent, only_job), (2, 1));

        let talent_set: HashSet<&String> = talent.iter().collect();
        let shared = talent_set.iter().filter(|s| job.iter().any(|j| j == **s)).count();
        assert_eq!(only_talent + shared, talent_set.len());
    }

    #[test]
    fn test_degree_comparisons() {
        assert_eq!(degree_level_diff(3, 4), -1);
        assert_eq!(degree_level_matched(3, 4), 0);
        assert_eq!(degree_level_matched(4, 4), 1);
        // Unknown talent degree never satisfies a known requirement
        assert_eq!(degree_level_matched(-1, 0), 0);
    }

    #[test]
    fn test_salary_expectation() {
        let policy = SalaryPolicy::default();
        let (delta, over) = salary_expectation(50000.0, 60000.0, &policy).unwrap();
        assert!((delta - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(over, 0);

        let (delta, over) = salary_expectation(90000.0, 60000.0, &policy).unwrap();
        assert!(delta < 0.0);
        assert_eq!(over, 1);
    }

    #[test]
    fn test_salary_zero_budget_fails_by_default() {
        let err = salary_expectation(50000.0, 0.0, &SalaryPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            MatchError::DegenerateDenominator { attribute: "max_salary" }
        ));
    }

    #[test]
    fn test_salary_zero_budget_sentinel() {
        let policy = SalaryPolicy {
            zero_budget: ZeroBudget::Sentinel,
            sentinel: -1.0,
        };
        let (delta, over) = salary_expectation(50000.0, 0.0, &policy).unwrap();
        assert_eq!(delta, -1.0);
        assert_eq!(over, 1);
    }

    #[test]
    fn test_language_ratios() {
        let talent = vec![Language::new("en", "B2"), Language::new("de", "A2")];
        let job = vec![Language::new("en", "B1"), Language::new("fr", "A1")];

        assert_eq!(language_match_ratio(&talent, &job), 0.5);
        assert_eq!(required_languages(&job), 2);
        // en: B2 >= B1; fr: missing -> A1 >= A1
        assert_eq!(rating_match_ratio(&talent, &job, &CefrScale::default()), 1.0);
    }

    #[test]
    fn test_rating_below_requirement() {
        let talent = vec![Language::new("de", "A2")];
        let job = vec![Language::new("de", "C1"), Language::new("en", "B2")];
        assert_eq!(rating_match_ratio(&talent, &job, &CefrScale::default()), 0.0);
    }

    #[test]
    fn test_unknown_job_rating_is_always_met() {
        let job = vec![Language::new("de", "fluent")];
        assert_eq!(rating_match_ratio(&[], &job, &CefrScale::default()), 1.0);
    }

    #[test]
    fn test_unknown_talent_rating_never_meets_requirement() {
        let talent = vec![Language::new("en", "native")];
        let job = vec![Language::new("en", "A1")];
        assert_eq!(rating_match_ratio(&talent, &job, &CefrScale::default()), 0.0);
    }

    #[test]
    fn test_language_ratios_empty_job() {
        let talent = vec![Language::new("en", "C2")];
        assert_eq!(language_match_ratio(&talent, &[]), 0.0);
        assert_eq!(rating_match_ratio(&talent, &[], &CefrScale::default()), 0.0);
        assert_eq!(required_languages(&[]), 0);
    }
}
