use crate::core::features::SalaryPolicy;
use crate::core::scales::{CefrScale, DegreeScale};
use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub features: FeatureSettings,
    #[serde(default)]
    #[validate(nested)]
    pub matching: MatchingSettings,
    #[serde(default)]
    #[validate(nested)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Data and model locations, all rooted at `working_dir`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
    /// Overrides `<working_dir>/models/match_model.json`
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

fn default_working_dir() -> PathBuf { PathBuf::from(".") }

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            model_path: None,
        }
    }
}

impl PathSettings {
    pub fn data_raw_dir(&self) -> PathBuf {
        self.working_dir.join("data").join("raw")
    }

    pub fn data_interim_dir(&self) -> PathBuf {
        self.working_dir.join("data").join("interim")
    }

    pub fn data_processed_dir(&self) -> PathBuf {
        self.working_dir.join("data").join("processed")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.working_dir.join("models")
    }

    pub fn raw_dataset_path(&self) -> PathBuf {
        self.data_raw_dir().join("data.json")
    }

    pub fn interim_dataset_path(&self) -> PathBuf {
        self.data_interim_dir().join("data.jsonl")
    }

    pub fn processed_dataset_path(&self) -> PathBuf {
        self.data_processed_dir().join("data.csv")
    }

    pub fn match_model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.models_dir().join("match_model.json"))
    }
}

/// Lookup tables and policies handed to the feature pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureSettings {
    #[serde(default)]
    pub degree_scale: DegreeScale,
    #[serde(default)]
    pub cefr_scale: CefrScale,
    #[serde(default)]
    pub salary: SalaryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchingSettings {
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,
}

fn default_batch_size() -> usize { crate::core::matcher::DEFAULT_BATCH_SIZE }

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrainingSettings {
    #[serde(default = "default_test_size")]
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub test_size: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_cv_folds")]
    #[validate(range(min = 2))]
    pub cv_folds: usize,
    /// Inverse regularization strength
    #[serde(default = "default_c")]
    #[validate(range(exclusive_min = 0.0))]
    pub c: f64,
    #[serde(default = "default_max_iter")]
    #[validate(range(min = 1))]
    pub max_iter: u64,
    #[serde(default = "default_tol")]
    pub tol: f64,
    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            seed: default_seed(),
            cv_folds: default_cv_folds(),
            c: default_c(),
            max_iter: default_max_iter(),
            tol: default_tol(),
            threshold: default_threshold(),
        }
    }
}

fn default_test_size() -> f64 { 0.2 }
fn default_seed() -> u64 { 42 }
fn default_cv_folds() -> usize { 5 }
fn default_c() -> f64 { 1.0 }
fn default_max_iter() -> u64 { 1000 }
fn default_tol() -> f64 { 1e-6 }
fn default_threshold() -> f64 { 0.5 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

fn environment() -> Environment {
    Environment::with_prefix("TALENT_MATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TALENT_MATCH__)
    ///    e.g., TALENT_MATCH__TRAINING__SEED -> training.seed
    /// 5. `WORKING_DIR`, if set, roots every data and model path
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment());

        Self::finish(with_working_dir(builder)?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment());

        Self::finish(with_working_dir(builder)?)
    }

    fn finish(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Apply the `WORKING_DIR` variable (typically from `.env`) as an override
fn with_working_dir(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config> {
    let builder = match std::env::var("WORKING_DIR") {
        Ok(dir) => builder.set_override("paths.working_dir", dir)?,
        Err(_) => builder,
    };
    Ok(builder.build()?)
}
