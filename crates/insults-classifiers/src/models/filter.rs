use ndarray::Array1;
use sprs::CsMat;

use crate::config::{FilterConfig, Penalty};
use crate::error::ModelError;
use crate::models::sgd::SgdRegressor;
use crate::models::traits::{Regressor, SparseTransform};
use crate::sparse::select_columns;

/// Threshold used for L1-type penalties when none is configured.
pub const L1_THRESHOLD: f64 = 1e-5;

/// Feature selector driven by the coefficients of a sparse SGD fit.
///
/// The regressor is only used to decide which columns survive; it never
/// produces predictions. Once fitted, the column mask is fixed.
#[derive(Debug, Clone)]
pub struct SparsityFilter {
    config: FilterConfig,
    support: Option<Vec<usize>>,
    n_features_in: usize,
    threshold: Option<f64>,
}

impl SparsityFilter {
    pub fn new(config: FilterConfig) -> Result<Self, ModelError> {
        // validate solver settings up front
        SgdRegressor::new(config.sgd.clone())?;
        if let Some(threshold) = config.threshold {
            if !(threshold >= 0.0) {
                return Err(ModelError::InvalidParameter(format!(
                    "filter threshold must be non-negative, got {}",
                    threshold
                )));
            }
        }
        Ok(SparsityFilter {
            config,
            support: None,
            n_features_in: 0,
            threshold: None,
        })
    }

    /// Indices of the kept input columns, ascending.
    pub fn support(&self) -> Option<&[usize]> {
        self.support.as_deref()
    }

    /// Threshold applied in the last fit.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    fn resolve_threshold(&self, coef: &Array1<f64>) -> f64 {
        if let Some(threshold) = self.config.threshold {
            return threshold;
        }
        match self.config.sgd.penalty {
            Penalty::L1 | Penalty::ElasticNet { .. } => L1_THRESHOLD,
            Penalty::L2 | Penalty::None => {
                if coef.is_empty() {
                    0.0
                } else {
                    coef.iter().map(|w| w.abs()).sum::<f64>() / coef.len() as f64
                }
            }
        }
    }
}

impl SparseTransform for SparsityFilter {
    fn name(&self) -> &str {
        "filter"
    }

    fn fit(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let mut sgd = SgdRegressor::new(self.config.sgd.clone())?;
        sgd.fit(x, y)?;
        let coef = sgd.coef().ok_or(ModelError::NotFitted("filter regressor"))?;

        let threshold = self.resolve_threshold(coef);
        let support: Vec<usize> = coef
            .iter()
            .enumerate()
            .filter(|(_, w)| w.abs() >= threshold)
            .map(|(col, _)| col)
            .collect();

        if support.is_empty() {
            return Err(ModelError::AllFeaturesDiscarded { threshold });
        }
        log::debug!(
            "Sparsity filter kept {} of {} features (threshold {:e})",
            support.len(),
            x.cols(),
            threshold
        );

        self.n_features_in = x.cols();
        self.threshold = Some(threshold);
        self.support = Some(support);
        Ok(())
    }

    fn transform(&self, x: &CsMat<f64>) -> Result<CsMat<f64>, ModelError> {
        let support = self.support.as_ref().ok_or(ModelError::NotFitted("sparsity filter"))?;
        if x.cols() != self.n_features_in {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features_in,
                found: x.cols(),
            });
        }
        Ok(select_columns(x, support))
    }
}
