use crate::config::FeatureSettings;
use crate::core::features::{
    degree_level_diff, degree_level_matched, language_match_ratio, match_ratio,
    rating_match_ratio, required_languages, salary_expectation, seniority_hit, skill_diff,
    SalaryPolicy,
};
use crate::core::scales::{CefrScale, DegreeScale, UNKNOWN_DEGREE};
use crate::error::{MatchError, Result};
use crate::models::{FeatureVector, JobPosting, PairRow, TalentProfile};
use ndarray::{Array1, Array2};
use serde_json::Value;

/// Transformation steps, in the order the pipeline applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    MatchRatio,
    SeniorityHit,
    SkillDiff,
    ScaleTalentDegree,
    ScaleJobDegree,
    SkillMatchRatio,
    DegreeLevelDiff,
    DegreeLevelMatched,
    SalaryExpectation,
    LanguageMatchRatio,
    RequiredLanguages,
    RatingMatchRatio,
}

impl Stage {
    pub const ORDER: [Stage; 12] = [
        Stage::MatchRatio,
        Stage::SeniorityHit,
        Stage::SkillDiff,
        Stage::ScaleTalentDegree,
        Stage::ScaleJobDegree,
        Stage::SkillMatchRatio,
        Stage::DegreeLevelDiff,
        Stage::DegreeLevelMatched,
        Stage::SalaryExpectation,
        Stage::LanguageMatchRatio,
        Stage::RequiredLanguages,
        Stage::RatingMatchRatio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::MatchRatio => "match_ratio",
            Stage::SeniorityHit => "seniority_match",
            Stage::SkillDiff => "skill_diff",
            Stage::ScaleTalentDegree => "talent_degree_scaled",
            Stage::ScaleJobDegree => "job_min_degree_scaled",
            Stage::SkillMatchRatio => "skill_match_ratio",
            Stage::DegreeLevelDiff => "degree_level_diff",
            Stage::DegreeLevelMatched => "degree_level_matched",
            Stage::SalaryExpectation => "salary_expectation",
            Stage::LanguageMatchRatio => "language_match_ratio",
            Stage::RequiredLanguages => "required_languages",
            Stage::RatingMatchRatio => "language_rating_match_ratio",
        }
    }
}

/// Columns filled in as stages run
#[derive(Debug, Default)]
struct Columns {
    match_ratio: Option<f64>,
    seniority_match: Option<u8>,
    skill_diff: Option<(usize, usize)>,
    talent_degree_scaled: Option<i32>,
    job_min_degree_scaled: Option<i32>,
    skill_match_ratio: Option<f64>,
    degree_level_diff: Option<i32>,
    degree_level_matched: Option<u8>,
    salary: Option<(f64, u8)>,
    language_match_ratio: Option<f64>,
    required_languages: Option<usize>,
    rating_match_ratio: Option<f64>,
}

fn column<T>(value: Option<T>, stage: &'static str, requires: Stage) -> Result<T> {
    value.ok_or(MatchError::StageOrder {
        stage,
        requires: requires.name(),
    })
}

/// Every column the pipeline computes for a pair, including the
/// intermediates that are not part of the model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairColumns {
    pub match_ratio: f64,
    pub talent_degree_scaled: i32,
    pub job_min_degree_scaled: i32,
    pub features: FeatureVector,
}

impl Columns {
    fn finish(self) -> Result<PairColumns> {
        const STAGE: &str = "projection";
        let (skill_diff_talent, skill_diff_job) = column(self.skill_diff, STAGE, Stage::SkillDiff)?;
        let (delta, over_budget) = column(self.salary, STAGE, Stage::SalaryExpectation)?;

        Ok(PairColumns {
            match_ratio: column(self.match_ratio, STAGE, Stage::MatchRatio)?,
            talent_degree_scaled: column(self.talent_degree_scaled, STAGE, Stage::ScaleTalentDegree)?,
            job_min_degree_scaled: column(self.job_min_degree_scaled, STAGE, Stage::ScaleJobDegree)?,
            features: FeatureVector {
                skill_match_ratio: column(self.skill_match_ratio, STAGE, Stage::SkillMatchRatio)?,
                seniority_match: column(self.seniority_match, STAGE, Stage::SeniorityHit)?,
                skill_diff_talent,
                skill_diff_job,
                salary_expectation_delta: delta,
                salary_expectation_over_budget: over_budget,
                degree_level_matched: column(self.degree_level_matched, STAGE, Stage::DegreeLevelMatched)?,
                degree_level_diff: column(self.degree_level_diff, STAGE, Stage::DegreeLevelDiff)?,
                language_match_ratio: column(self.language_match_ratio, STAGE, Stage::LanguageMatchRatio)?,
                required_languages: column(self.required_languages, STAGE, Stage::RequiredLanguages)?,
                language_rating_match_ratio: column(self.rating_match_ratio, STAGE, Stage::RatingMatchRatio)?,
            },
        })
    }
}

/// Whether `process` keeps the label column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// Training/feature-build time: every row must carry a 0/1 label
    Labeled,
    /// Inference time: labels are neither required nor read
    Ignore,
}

/// Output of `FeaturePipeline::process`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub features: Vec<FeatureVector>,
    pub labels: Option<Vec<u8>>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_matrix(&self) -> Array2<f64> {
        feature_matrix(&self.features)
    }

    /// Labels as a float vector, `None` for label-less tables
    pub fn label_vector(&self) -> Option<Array1<f64>> {
        self.labels
            .as_ref()
            .map(|labels| labels.iter().map(|&l| l as f64).collect())
    }
}

/// Stack feature vectors into an `n x FeatureVector::LEN` matrix
pub fn feature_matrix(features: &[FeatureVector]) -> Array2<f64> {
    let rows: Vec<[f64; FeatureVector::LEN]> = features.iter().map(FeatureVector::to_array).collect();
    Array2::from_shape_fn((rows.len(), FeatureVector::LEN), |(i, j)| rows[i][j])
}

/// Coerce a raw label to 0/1
pub fn coerce_label(value: &Value) -> Result<u8> {
    let invalid = || MatchError::InvalidLabel(value.to_string());
    match value {
        Value::Bool(flag) => Ok(u8::from(*flag)),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 0.0 => Ok(0),
            Some(v) if v == 1.0 => Ok(1),
            _ => Err(invalid()),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "false" => Ok(0),
            "1" | "true" => Ok(1),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Turns talent/job pairs into feature vectors.
///
/// Holds the lookup tables and salary policy the feature functions need; it
/// never mutates its input rows.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    degree_scale: DegreeScale,
    cefr_scale: CefrScale,
    salary_policy: SalaryPolicy,
}

impl FeaturePipeline {
    pub fn new(degree_scale: DegreeScale, cefr_scale: CefrScale, salary_policy: SalaryPolicy) -> Self {
        Self {
            degree_scale,
            cefr_scale,
            salary_policy,
        }
    }

    pub fn from_settings(settings: &FeatureSettings) -> Self {
        Self::new(
            settings.degree_scale.clone(),
            settings.cefr_scale.clone(),
            settings.salary,
        )
    }

    pub fn degree_scale(&self) -> &DegreeScale {
        &self.degree_scale
    }

    fn apply(
        &self,
        stage: Stage,
        talent: &TalentProfile,
        job: &JobPosting,
        cols: &mut Columns,
    ) -> Result<()> {
        match stage {
            Stage::MatchRatio => {
                cols.match_ratio = Some(match_ratio(&talent.job_roles, &job.job_roles));
            }
            Stage::SeniorityHit => {
                cols.seniority_match = Some(seniority_hit(&talent.seniority, &job.seniorities));
            }
            Stage::SkillDiff => {
                cols.skill_diff = Some(skill_diff(&talent.job_roles, &job.job_roles));
            }
            Stage::ScaleTalentDegree => {
                cols.talent_degree_scaled = Some(self.degree_scale.scale(&talent.degree));
            }
            Stage::ScaleJobDegree => {
                cols.job_min_degree_scaled = Some(self.degree_scale.scale(&job.min_degree));
            }
            Stage::SkillMatchRatio => {
                cols.skill_match_ratio = Some(match_ratio(&talent.job_roles, &job.job_roles));
            }
            Stage::DegreeLevelDiff | Stage::DegreeLevelMatched => {
                let talent_scaled = column(cols.talent_degree_scaled, stage.name(), Stage::ScaleTalentDegree)?;
                let job_scaled = column(cols.job_min_degree_scaled, stage.name(), Stage::ScaleJobDegree)?;
                if stage == Stage::DegreeLevelDiff {
                    cols.degree_level_diff = Some(degree_level_diff(talent_scaled, job_scaled));
                } else {
                    cols.degree_level_matched = Some(degree_level_matched(talent_scaled, job_scaled));
                }
            }
            Stage::SalaryExpectation => {
                cols.salary = Some(salary_expectation(
                    talent.salary_expectation,
                    job.max_salary,
                    &self.salary_policy,
                )?);
            }
            Stage::LanguageMatchRatio => {
                cols.language_match_ratio = Some(language_match_ratio(&talent.languages, &job.languages));
            }
            Stage::RequiredLanguages => {
                cols.required_languages = Some(required_languages(&job.languages));
            }
            Stage::RatingMatchRatio => {
                cols.rating_match_ratio = Some(rating_match_ratio(
                    &talent.languages,
                    &job.languages,
                    &self.cefr_scale,
                ));
            }
        }
        Ok(())
    }

    /// Run every stage over one pair and return all computed columns
    pub fn transform_pair(&self, talent: &TalentProfile, job: &JobPosting) -> Result<PairColumns> {
        let mut cols = Columns::default();
        for stage in Stage::ORDER {
            self.apply(stage, talent, job, &mut cols)?;
        }
        cols.finish()
    }

    /// Model input for one pair
    pub fn features(&self, talent: &TalentProfile, job: &JobPosting) -> Result<FeatureVector> {
        Ok(self.transform_pair(talent, job)?.features)
    }

    /// Project merged rows onto the feature columns, plus the coerced label
    /// unless `mode` is `LabelMode::Ignore`
    pub fn process(&self, rows: &[PairRow], mode: LabelMode) -> Result<FeatureTable> {
        let features = rows
            .iter()
            .map(|row| self.features(&row.talent, &row.job))
            .collect::<Result<Vec<_>>>()?;

        let labels = match mode {
            LabelMode::Ignore => None,
            LabelMode::Labeled => Some(
                rows.iter()
                    .enumerate()
                    .map(|(i, row)| {
                        row.label
                            .as_ref()
                            .ok_or(MatchError::MissingLabel { row: i })
                            .and_then(coerce_label)
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        let unknown_degrees = rows
            .iter()
            .flat_map(|row| [row.talent.degree.as_str(), row.job.min_degree.as_str()])
            .filter(|degree| self.degree_scale.scale(degree) == UNKNOWN_DEGREE)
            .count();
        if unknown_degrees > 0 {
            tracing::warn!("{} degree labels not in the degree scale, ranked {}", unknown_degrees, UNKNOWN_DEGREE);
        }

        tracing::debug!("Processed {} rows into {} features", rows.len(), FeatureVector::LEN);

        Ok(FeatureTable { features, labels })
    }
}
