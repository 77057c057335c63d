use ndarray::Array1;
use sprs::CsMat;

use crate::error::ModelError;

/// An intermediate pipeline stage mapping one sparse feature matrix to another.
///
/// `fit` receives the labels so supervised stages (feature selection) can use
/// them; unsupervised stages ignore them.
pub trait SparseTransform {
    /// Short stage name used in logs and error context.
    fn name(&self) -> &str;

    fn fit(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    /// Apply the fitted stage. Must not change the fitted state.
    fn transform(&self, x: &CsMat<f64>) -> Result<CsMat<f64>, ModelError>;

    fn fit_transform(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<CsMat<f64>, ModelError> {
        self.fit(x, y)?;
        self.transform(x)
    }
}

/// Final pipeline stage producing one score per row.
pub trait Regressor {
    fn fit(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    fn predict(&self, x: &CsMat<f64>) -> Result<Array1<f64>, ModelError>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "regressor"
    }
}

/// A regressor that keeps per-stage snapshots and can score each of them.
pub trait StagedModel: Regressor {
    /// Iteration counts and the matching AUC values, in stage order.
    fn staged_auc(&self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(Vec<usize>, Vec<f64>), ModelError>;
}
