//! Command line interface: offline pipeline steps and matching

use crate::config::Settings;
use crate::core::pipeline::{FeaturePipeline, LabelMode};
use crate::core::{normalize_examples, Matcher};
use crate::error::{MatchError, Result};
use crate::models::{BulkMatchRequest, MatchRequest};
use crate::services::{dataset, model_store};
use crate::training::Trainer;
use clap::{ArgGroup, Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use validator::Validate;

#[derive(Parser)]
#[command(name = "talent-match")]
#[command(about = "Score talent profiles against job postings with a trained classifier")]
#[command(long_about = "Prepare datasets, build features, train the match model and score talent/job pairs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize and merge the raw dataset into the interim dataset
    MakeDataset {
        /// Raw dataset (JSON array or JSON lines of {talent, job, label})
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Interim dataset destination
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the feature table from the interim dataset
    BuildFeatures {
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Processed CSV destination
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train, evaluate and persist the match model
    Train {
        /// Processed CSV
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Model artifact destination
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a single talent/job pair
    #[command(group(ArgGroup::new("source").required(true).args(["request", "sample"])))]
    Match {
        /// JSON file holding {"talent": {...}, "job": {...}}
        #[arg(short, long, conflicts_with = "sample")]
        request: Option<PathBuf>,

        /// Pick the pair at random from the raw dataset
        #[arg(short, long)]
        sample: bool,

        /// Seed for the random pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score every talent against every job, best match first
    MatchBulk {
        /// JSON file holding {"talents": [...], "jobs": [...]}
        #[arg(short, long, conflicts_with = "sample")]
        request: Option<PathBuf>,

        /// Sample this many talents and jobs from the raw dataset
        #[arg(short, long)]
        sample: Option<usize>,

        /// Seed for the random sample
        #[arg(long)]
        seed: Option<u64>,

        /// Print only the first N entries of the ranked list. Every pair is
        /// still scored and sorted; this limits output, not work.
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Show the effective configuration
    Config,
}

/// Talents and jobs drawn by `match-bulk` when neither a request nor a sample size is given
const DEFAULT_SAMPLE: usize = 5;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn load_matcher(settings: &Settings) -> Result<Matcher> {
    let matcher = Matcher::load(
        settings.paths.match_model_path(),
        FeaturePipeline::from_settings(&settings.features),
    )?;
    Ok(matcher.with_batch_size(settings.matching.batch_size))
}

/// Execute one command and return what it prints
pub fn run(command: &Commands, settings: &Settings) -> Result<Value> {
    match command {
        Commands::MakeDataset { input, output } => {
            let input = input.clone().unwrap_or_else(|| settings.paths.raw_dataset_path());
            let output = output.clone().unwrap_or_else(|| settings.paths.interim_dataset_path());

            let examples = dataset::load_raw(&input)?;
            let rows = normalize_examples(&examples)?;
            dataset::write_interim(&rows, &output)?;
            info!("Interim dataset shape: {} rows", rows.len());

            Ok(json!({ "rows": rows.len(), "path": output }))
        }

        Commands::BuildFeatures { input, output } => {
            let input = input.clone().unwrap_or_else(|| settings.paths.interim_dataset_path());
            let output = output.clone().unwrap_or_else(|| settings.paths.processed_dataset_path());

            let rows = dataset::read_interim(&input)?;
            let table = FeaturePipeline::from_settings(&settings.features).process(&rows, LabelMode::Labeled)?;
            dataset::write_processed(&table, &output)?;

            Ok(json!({ "rows": table.len(), "path": output }))
        }

        Commands::Train { input, output } => {
            let input = input.clone().unwrap_or_else(|| settings.paths.processed_dataset_path());
            let output = output.clone().unwrap_or_else(|| settings.paths.match_model_path());

            let table = dataset::read_processed(&input)?;
            let (model, report) = Trainer::from_settings(&settings.training).run(&table)?;
            model_store::save(&model, &output)?;

            Ok(serde_json::to_value(&report)?)
        }

        Commands::Match { request, sample, seed } => {
            let request: MatchRequest = match (request, sample) {
                (Some(path), false) => read_json(path)?,
                (Some(_), true) => {
                    return Err(MatchError::Usage("--request and --sample are exclusive".to_string()))
                }
                (None, false) => return Err(MatchError::Usage("pass --request or --sample".to_string())),
                (None, true) => {
                    let examples = dataset::load_raw(settings.paths.raw_dataset_path())?;
                    let mut drawn = dataset::sample_bulk_request(&examples, 1, *seed)?;
                    MatchRequest {
                        talent: drawn.talents.swap_remove(0),
                        job: drawn.jobs.swap_remove(0),
                    }
                }
            };

            let matcher = load_matcher(settings)?;
            let result = matcher.match_pair(&request.talent, &request.job)?;
            Ok(serde_json::to_value(&result)?)
        }

        Commands::MatchBulk { request, sample, seed, top } => {
            let request: BulkMatchRequest = match request {
                Some(path) => read_json(path)?,
                None => {
                    let examples = dataset::load_raw(settings.paths.raw_dataset_path())?;
                    let n = sample.unwrap_or_else(|| examples.len().min(DEFAULT_SAMPLE));
                    dataset::sample_bulk_request(&examples, n, *seed)?
                }
            };
            request.validate()?;

            let matcher = load_matcher(settings)?;
            let mut results = matcher.match_bulk(&request.talents, &request.jobs)?;
            if let Some(top) = top {
                results.truncate(*top);
            }
            Ok(serde_json::to_value(&results)?)
        }

        Commands::Config => Ok(serde_json::to_value(settings)?),
    }
}
