use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Weight penalty applied by the SGD solver.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    None,
    L1,
    L2,
    ElasticNet { l1_ratio: f64 },
}

impl Penalty {
    /// Share of `alpha` applied as an L1 penalty.
    pub fn l1_ratio(&self) -> f64 {
        match self {
            Penalty::None | Penalty::L2 => 0.0,
            Penalty::L1 => 1.0,
            Penalty::ElasticNet { l1_ratio } => *l1_ratio,
        }
    }
}

impl FromStr for Penalty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Penalty::None),
            "l1" => Ok(Penalty::L1),
            "l2" => Ok(Penalty::L2),
            "elasticnet" | "elastic_net" => Ok(Penalty::ElasticNet { l1_ratio: 0.15 }),
            _ => Err(format!(
                "Unknown penalty: {}. Expected one of none, l1, l2, elasticnet",
                s
            )),
        }
    }
}

/// Regression loss optimised by SGD.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    Squared,
    Huber { epsilon: f64 },
    EpsilonInsensitive { epsilon: f64 },
}

impl FromStr for Loss {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "squared" | "squared_loss" => Ok(Loss::Squared),
            "huber" => Ok(Loss::Huber { epsilon: 0.1 }),
            "epsilon_insensitive" => Ok(Loss::EpsilonInsensitive { epsilon: 0.1 }),
            _ => Err(format!(
                "Unknown loss: {}. Expected one of squared, huber, epsilon_insensitive",
                s
            )),
        }
    }
}

/// Step size schedule for SGD.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LearningRate {
    Constant { eta0: f64 },
    InvScaling { eta0: f64, power_t: f64 },
}

impl LearningRate {
    /// Learning rate for the `t`-th sample (1-based).
    pub fn eta(&self, t: f64) -> f64 {
        match self {
            LearningRate::Constant { eta0 } => *eta0,
            LearningRate::InvScaling { eta0, power_t } => eta0 / t.powf(*power_t),
        }
    }
}

impl FromStr for LearningRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constant" => Ok(LearningRate::Constant { eta0: 0.01 }),
            "invscaling" => Ok(LearningRate::InvScaling {
                eta0: 0.01,
                power_t: 0.25,
            }),
            _ => Err(format!(
                "Unknown learning rate schedule: {}. Expected constant or invscaling",
                s
            )),
        }
    }
}

/// Row normalisation applied after TF-IDF weighting.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    None,
    L1,
    L2,
}

impl FromStr for Norm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Norm::None),
            "l1" => Ok(Norm::L1),
            "l2" => Ok(Norm::L2),
            _ => Err(format!("Unknown norm: {}. Expected none, l1 or l2", s)),
        }
    }
}

/// Character n-gram vectorizer settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VectorizerConfig {
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    /// Minimum number of documents an n-gram must appear in.
    pub min_df: usize,
    /// Maximum share of documents an n-gram may appear in.
    pub max_df: f64,
    pub max_features: Option<usize>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 5),
            lowercase: false,
            min_df: 1,
            max_df: 1.0,
            max_features: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TfidfConfig {
    pub sublinear_tf: bool,
    pub smooth_idf: bool,
    pub norm: Norm,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            sublinear_tf: true,
            smooth_idf: true,
            norm: Norm::L2,
        }
    }
}

/// Settings of the base SGD regressor.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SgdConfig {
    pub alpha: f64,
    pub penalty: Penalty,
    pub loss: Loss,
    pub learning_rate: LearningRate,
    /// Number of passes over the training data.
    pub n_iter: usize,
    pub fit_intercept: bool,
    /// Scale applied to intercept updates; sparse inputs use a small value.
    pub intercept_decay: f64,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            alpha: 1e-5,
            penalty: Penalty::L1,
            loss: Loss::Squared,
            learning_rate: LearningRate::InvScaling {
                eta0: 0.01,
                power_t: 0.25,
            },
            n_iter: 200,
            fit_intercept: true,
            intercept_decay: 0.01,
            shuffle: true,
            seed: 0,
        }
    }
}

/// Feature-selection regressor settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub sgd: SgdConfig,
    /// Minimum `|coef|` for a feature to be kept. `None` picks 1e-5 for
    /// L1-type penalties and the mean `|coef|` otherwise.
    pub threshold: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sgd: SgdConfig::default(),
            threshold: None,
        }
    }
}

/// Staged regressor settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StagedConfig {
    /// Epochs per recorded stage.
    pub step_size: usize,
    /// Total epochs; must be a multiple of `step_size`.
    pub total_iterations: usize,
    pub alpha: f64,
    pub penalty: Penalty,
    /// Constant learning rate used for every step.
    pub eta0: f64,
    pub loss: Loss,
    pub fit_intercept: bool,
    pub intercept_decay: f64,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for StagedConfig {
    fn default() -> Self {
        Self {
            step_size: 10,
            total_iterations: 1600,
            alpha: 4e-7,
            penalty: Penalty::L1,
            eta0: 1e-3,
            loss: Loss::Squared,
            fit_intercept: true,
            intercept_decay: 0.01,
            shuffle: true,
            seed: 0,
        }
    }
}

impl StagedConfig {
    /// SGD settings for a single step of `step_size` epochs.
    pub fn step_sgd_config(&self) -> SgdConfig {
        SgdConfig {
            alpha: self.alpha,
            penalty: self.penalty,
            loss: self.loss,
            learning_rate: LearningRate::Constant { eta0: self.eta0 },
            n_iter: self.step_size,
            fit_intercept: self.fit_intercept,
            intercept_decay: self.intercept_decay,
            shuffle: self.shuffle,
            seed: self.seed,
        }
    }
}

/// Vectorizer -> TF-IDF -> sparsity filter -> staged regressor.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub vectorizer: VectorizerConfig,
    pub tfidf: TfidfConfig,
    pub filter: FilterConfig,
    pub regressor: StagedConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CrossValidationConfig {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
    /// Evaluate folds on the rayon thread pool.
    pub parallel: bool,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            n_splits: 15,
            shuffle: false,
            seed: 0,
            parallel: false,
        }
    }
}

/// Everything one experiment run needs: inputs, outputs and model settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExperimentConfig {
    pub train_file: PathBuf,
    pub test_file: PathBuf,
    pub sample_submission_file: PathBuf,
    pub folds_dir: PathBuf,
    pub submissions_dir: PathBuf,
    pub report_file: Option<PathBuf>,
    pub pipeline: PipelineConfig,
    pub cross_validation: CrossValidationConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            train_file: PathBuf::from("Data/train.csv"),
            test_file: PathBuf::from("Data/test.csv"),
            sample_submission_file: PathBuf::from("Data/sample_submission_null.csv"),
            folds_dir: PathBuf::from("Folds"),
            submissions_dir: PathBuf::from("submissions"),
            report_file: Some(PathBuf::from("insults_cv_report.html")),
            pipeline: PipelineConfig::default(),
            cross_validation: CrossValidationConfig::default(),
        }
    }
}
