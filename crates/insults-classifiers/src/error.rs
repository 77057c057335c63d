use std::error::Error;
use std::fmt;

/// Errors raised by the featurizers, models and fold splitter.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// `total_iterations` is not a positive multiple of `step_size`.
    InvalidStepSize {
        step_size: usize,
        total_iterations: usize,
    },
    /// Only one of coefficients / intercept was supplied to a prediction call.
    PartialOverride,
    /// The model or transform was used before `fit`.
    NotFitted(&'static str),
    /// An empty document collection or matrix was passed in.
    EmptyInput(&'static str),
    /// No n-gram survived the document-frequency filters.
    EmptyVocabulary,
    /// The sparsity filter zeroed every feature.
    AllFeaturesDiscarded { threshold: f64 },
    /// Feature count differs between fit and transform / predict.
    DimensionMismatch { expected: usize, found: usize },
    /// Labels and samples (or labels and scores) have different lengths.
    LengthMismatch { expected: usize, found: usize },
    /// Weights became NaN or infinite during SGD.
    Diverged { epoch: usize },
    /// Fold configuration cannot partition the data.
    InvalidFolds { n_samples: usize, n_splits: usize },
    /// A hyper-parameter is outside its valid range.
    InvalidParameter(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::InvalidStepSize {
                step_size,
                total_iterations,
            } => write!(
                f,
                "total_iterations ({}) must be a positive multiple of step_size ({})",
                total_iterations, step_size
            ),
            ModelError::PartialOverride => write!(
                f,
                "coefficients and intercept must be supplied together"
            ),
            ModelError::NotFitted(what) => write!(f, "{} has not been fitted", what),
            ModelError::EmptyInput(what) => write!(f, "{} is empty", what),
            ModelError::EmptyVocabulary => write!(
                f,
                "vocabulary is empty after document-frequency filtering"
            ),
            ModelError::AllFeaturesDiscarded { threshold } => write!(
                f,
                "every feature falls below the selection threshold {}",
                threshold
            ),
            ModelError::DimensionMismatch { expected, found } => write!(
                f,
                "expected {} features, found {}",
                expected, found
            ),
            ModelError::LengthMismatch { expected, found } => write!(
                f,
                "expected {} values, found {}",
                expected, found
            ),
            ModelError::Diverged { epoch } => write!(
                f,
                "SGD diverged (non-finite weights) during epoch {}",
                epoch
            ),
            ModelError::InvalidFolds {
                n_samples,
                n_splits,
            } => write!(
                f,
                "cannot split {} samples into {} folds (need at least 2 folds and one sample per fold)",
                n_samples, n_splits
            ),
            ModelError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
        }
    }
}

impl Error for ModelError {}
