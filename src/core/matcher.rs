use crate::core::classifier::{Classifier, MatchModel};
use crate::core::normalize::{flatten_job, flatten_jobs, flatten_talent, flatten_talents};
use crate::core::pipeline::{feature_matrix, FeaturePipeline};
use crate::error::{MatchError, Result};
use crate::models::{FeatureVector, MatchResult};
use crate::services::model_store;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;

/// Rows scored per classifier call in bulk matching
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Round a probability to 3 decimals
#[inline]
pub fn round_score(probability: f64) -> f64 {
    (probability * 1000.0).round() / 1000.0
}

/// Lazy `talents x jobs` enumeration, talent-major: `(0,0), (0,1), ..., (1,0), ...`
#[derive(Debug, Clone)]
pub struct CrossProduct {
    talents: usize,
    jobs: usize,
    next: usize,
}

impl CrossProduct {
    pub fn new(talents: usize, jobs: usize) -> Self {
        Self { talents, jobs, next: 0 }
    }
}

impl Iterator for CrossProduct {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.jobs == 0 || self.next >= self.talents * self.jobs {
            return None;
        }
        let pair = (self.next / self.jobs, self.next % self.jobs);
        self.next += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.talents * self.jobs).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CrossProduct {}

/// Scores talent/job pairs with a trained classifier.
///
/// # Failure model
/// Any malformed record, missing attribute or degenerate salary budget aborts
/// the whole call with a typed error. Bulk calls return no partial results.
#[derive(Debug, Clone)]
pub struct Matcher<C = MatchModel> {
    pipeline: FeaturePipeline,
    classifier: C,
    batch_size: usize,
}

impl Matcher<MatchModel> {
    /// Load the persisted model; fails immediately if it cannot be read
    pub fn load<P: AsRef<Path>>(model_path: P, pipeline: FeaturePipeline) -> Result<Self> {
        let model = model_store::load(model_path)?;
        Ok(Self::new(model, pipeline))
    }
}

impl<C: Classifier> Matcher<C> {
    pub fn new(classifier: C, pipeline: FeaturePipeline) -> Self {
        Self {
            pipeline,
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Probabilities and predicted labels for a chunk of feature vectors
    fn score(&self, features: &[FeatureVector]) -> Result<Vec<(u8, f64)>> {
        let proba = self.classifier.predict_proba(&feature_matrix(features))?;
        if proba.len() != features.len() {
            return Err(MatchError::PredictionCount {
                expected: features.len(),
                actual: proba.len(),
            });
        }
        let threshold = self.classifier.threshold();
        Ok(proba
            .iter()
            .map(|&p| (u8::from(p > threshold), round_score(p)))
            .collect())
    }

    /// Score a single talent/job pair
    pub fn match_pair<'a>(&self, talent: &'a Value, job: &'a Value) -> Result<MatchResult<'a>> {
        let features = self
            .pipeline
            .features(&flatten_talent(talent)?, &flatten_job(job)?)?;
        let (label, score) = self.score(&[features])?.remove(0);

        Ok(MatchResult { talent, job, label, score })
    }

    /// Score every talent against every job and rank by score, descending.
    ///
    /// Records are flattened once each; pairs are then produced lazily and
    /// scored `batch_size` rows at a time. The ranked result itself holds
    /// all `talents.len() * jobs.len()` entries, borrowing the inputs. Ties
    /// keep talent-major enumeration order.
    pub fn match_bulk<'a>(&self, talents: &'a [Value], jobs: &'a [Value]) -> Result<Vec<MatchResult<'a>>> {
        let talent_profiles = flatten_talents(talents)?;
        let job_postings = flatten_jobs(jobs)?;

        let pairs = CrossProduct::new(talents.len(), jobs.len());
        let total = pairs.len();
        let mut results = Vec::with_capacity(total);
        let mut chunk_pairs = Vec::with_capacity(self.batch_size.min(total));
        let mut chunk_features = Vec::with_capacity(self.batch_size.min(total));

        let mut pairs = pairs.peekable();
        while let Some((t, j)) = pairs.next() {
            chunk_features.push(self.pipeline.features(&talent_profiles[t], &job_postings[j])?);
            chunk_pairs.push((t, j));

            if chunk_pairs.len() == self.batch_size || pairs.peek().is_none() {
                let scored = self.score(&chunk_features)?;
                results.extend(chunk_pairs.drain(..).zip(scored).map(|((t, j), (label, score))| {
                    MatchResult {
                        talent: &talents[t],
                        job: &jobs[j],
                        label,
                        score,
                    }
                }));
                chunk_features.clear();
                tracing::debug!("Scored {} of {} pairs", results.len(), total);
            }
        }

        // Stable sort: equal scores keep enumeration order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        tracing::info!(
            "Ranked {} pairs ({} talents x {} jobs)",
            results.len(),
            talents.len(),
            jobs.len()
        );

        Ok(results)
    }
}
