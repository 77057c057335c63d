//! Plain stochastic gradient descent for sparse linear regression.
//!
//! Weights are stored as `wscale * v` so the L2 decay applied after every
//! sample costs O(1). L1 (and the L1 part of elastic net) uses the cumulative
//! truncated-gradient penalty of Tsuruoka et al. (2009), touching only the
//! weights of features present in the current sample.
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sprs::{CsMat, CsVecView};

use crate::config::{Loss, SgdConfig};
use crate::error::ModelError;
use crate::models::traits::Regressor;
use crate::sparse::row_dot;

/// Below this scale the weight vector is renormalised to avoid underflow.
const MIN_WSCALE: f64 = 1e-9;

/// Coefficients a fit starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Uninitialized,
    Warm { coef: Array1<f64>, intercept: f64 },
}

impl ModelState {
    pub fn coef(&self) -> Option<&Array1<f64>> {
        match self {
            ModelState::Warm { coef, .. } => Some(coef),
            ModelState::Uninitialized => None,
        }
    }

    pub fn intercept(&self) -> Option<f64> {
        match self {
            ModelState::Warm { intercept, .. } => Some(*intercept),
            ModelState::Uninitialized => None,
        }
    }
}

impl Default for ModelState {
    fn default() -> Self {
        ModelState::Uninitialized
    }
}

impl Loss {
    /// Derivative of the loss with respect to the prediction `p`.
    pub fn dloss(&self, p: f64, y: f64) -> f64 {
        match *self {
            Loss::Squared => p - y,
            Loss::Huber { epsilon } => {
                let r = p - y;
                if r.abs() <= epsilon {
                    r
                } else if r > 0.0 {
                    epsilon
                } else {
                    -epsilon
                }
            }
            Loss::EpsilonInsensitive { epsilon } => {
                if y - p > epsilon {
                    -1.0
                } else if p - y > epsilon {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

struct WeightVector {
    v: Vec<f64>,
    wscale: f64,
}

impl WeightVector {
    fn new(v: Vec<f64>) -> Self {
        WeightVector { v, wscale: 1.0 }
    }

    fn dot(&self, row: CsVecView<f64>) -> f64 {
        self.wscale * row_dot(row, &self.v)
    }

    fn add(&mut self, row: CsVecView<f64>, c: f64) {
        let c = c / self.wscale;
        for (col, &value) in row.iter() {
            self.v[col] += c * value;
        }
    }

    fn scale(&mut self, c: f64) {
        self.wscale *= c;
        if self.wscale < MIN_WSCALE {
            self.reset_wscale();
        }
    }

    fn reset_wscale(&mut self) {
        let wscale = self.wscale;
        for w in self.v.iter_mut() {
            *w *= wscale;
        }
        self.wscale = 1.0;
    }

    fn get(&self, col: usize) -> f64 {
        self.wscale * self.v[col]
    }

    fn set(&mut self, col: usize, value: f64) {
        self.v[col] = value / self.wscale;
    }

    fn is_finite(&self) -> bool {
        self.wscale.is_finite() && self.v.iter().all(|w| w.is_finite())
    }

    fn into_array(mut self) -> Array1<f64> {
        self.reset_wscale();
        Array1::from(self.v)
    }
}

/// Linear regressor trained by per-sample SGD on CSR matrices.
#[derive(Debug, Clone)]
pub struct SgdRegressor {
    config: SgdConfig,
    state: ModelState,
}

impl SgdRegressor {
    pub fn new(config: SgdConfig) -> Result<Self, ModelError> {
        validate_sgd_config(&config)?;
        Ok(SgdRegressor {
            config,
            state: ModelState::Uninitialized,
        })
    }

    pub fn config(&self) -> &SgdConfig {
        &self.config
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn into_state(self) -> ModelState {
        self.state
    }

    pub fn coef(&self) -> Option<&Array1<f64>> {
        self.state.coef()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.state.intercept()
    }

    /// Run `n_iter` epochs starting from `init`.
    pub fn fit_from(
        &mut self,
        x: &CsMat<f64>,
        y: &Array1<f64>,
        init: ModelState,
    ) -> Result<(), ModelError> {
        let n_samples = x.rows();
        let n_features = x.cols();
        if n_samples == 0 {
            return Err(ModelError::EmptyInput("training matrix"));
        }
        if y.len() != n_samples {
            return Err(ModelError::LengthMismatch {
                expected: n_samples,
                found: y.len(),
            });
        }

        let (coef, mut intercept) = match init {
            ModelState::Uninitialized => (vec![0.0; n_features], 0.0),
            ModelState::Warm { coef, intercept } => {
                if coef.len() != n_features {
                    return Err(ModelError::DimensionMismatch {
                        expected: n_features,
                        found: coef.len(),
                    });
                }
                (coef.to_vec(), intercept)
            }
        };

        let config = &self.config;
        let l1_ratio = config.penalty.l1_ratio();
        let has_l2 = matches!(
            config.penalty,
            crate::config::Penalty::L2 | crate::config::Penalty::ElasticNet { .. }
        );
        let has_l1 = l1_ratio > 0.0;

        let mut w = WeightVector::new(coef);
        let mut q = if has_l1 { vec![0.0; n_features] } else { Vec::new() };
        let mut u = 0.0;
        let mut t = 1.0;

        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut rng = StdRng::seed_from_u64(config.seed);

        for epoch in 0..config.n_iter {
            if config.shuffle {
                order.shuffle(&mut rng);
            }
            let mut sum_loss = 0.0;

            for &i in &order {
                let row = match x.outer_view(i) {
                    Some(row) => row,
                    None => continue,
                };
                let p = w.dot(row.view()) + intercept;
                let dloss = config.loss.dloss(p, y[i]);
                sum_loss += dloss * dloss;

                let eta = config.learning_rate.eta(t);
                let update = -eta * dloss;

                if has_l2 {
                    w.scale((1.0 - (1.0 - l1_ratio) * eta * config.alpha).max(0.0));
                }
                if update != 0.0 {
                    w.add(row.view(), update);
                    if config.fit_intercept {
                        intercept += update * config.intercept_decay;
                    }
                }
                if has_l1 {
                    u += l1_ratio * eta * config.alpha;
                    apply_l1_penalty(&mut w, &mut q, row.view(), u);
                }
                t += 1.0;
            }

            if !w.is_finite() || !intercept.is_finite() {
                return Err(ModelError::Diverged { epoch });
            }
            log::trace!(
                "SGD epoch {}: mean squared gradient {:.6}, intercept {:.6}",
                epoch + 1,
                sum_loss / n_samples as f64,
                intercept
            );
        }

        self.state = ModelState::Warm {
            coef: w.into_array(),
            intercept,
        };
        Ok(())
    }

    /// Raw `X·w + b`.
    pub fn decision_function(&self, x: &CsMat<f64>) -> Result<Array1<f64>, ModelError> {
        match &self.state {
            ModelState::Warm { coef, intercept } => linear_decision(x, coef, *intercept),
            ModelState::Uninitialized => Err(ModelError::NotFitted("SGD regressor")),
        }
    }
}

impl Regressor for SgdRegressor {
    fn fit(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        self.fit_from(x, y, ModelState::Uninitialized)
    }

    fn predict(&self, x: &CsMat<f64>) -> Result<Array1<f64>, ModelError> {
        self.decision_function(x)
    }

    fn name(&self) -> &str {
        "sgd"
    }
}

/// Clip every weight touched by `row` towards zero by the accumulated penalty.
fn apply_l1_penalty(w: &mut WeightVector, q: &mut [f64], row: CsVecView<f64>, u: f64) {
    for (col, _) in row.iter() {
        let z = w.get(col);
        let clipped = if z > 0.0 {
            (z - (u + q[col])).max(0.0)
        } else if z < 0.0 {
            (z + (u - q[col])).min(0.0)
        } else {
            z
        };
        w.set(col, clipped);
        q[col] += clipped - z;
    }
}

/// `X·coef + intercept` for every row of a CSR matrix.
pub fn linear_decision(
    x: &CsMat<f64>,
    coef: &Array1<f64>,
    intercept: f64,
) -> Result<Array1<f64>, ModelError> {
    if x.cols() != coef.len() {
        return Err(ModelError::DimensionMismatch {
            expected: coef.len(),
            found: x.cols(),
        });
    }
    let weights = coef.as_slice().ok_or_else(|| {
        ModelError::InvalidParameter("coefficient vector is not contiguous".to_string())
    })?;
    Ok(x
        .outer_iterator()
        .map(|row| row_dot(row, weights) + intercept)
        .collect())
}

pub(crate) fn validate_sgd_config(config: &SgdConfig) -> Result<(), ModelError> {
    if config.n_iter == 0 {
        return Err(ModelError::InvalidParameter("n_iter must be positive".to_string()));
    }
    if !(config.alpha >= 0.0) {
        return Err(ModelError::InvalidParameter(format!(
            "alpha must be non-negative, got {}",
            config.alpha
        )));
    }
    let l1_ratio = config.penalty.l1_ratio();
    if !(0.0..=1.0).contains(&l1_ratio) {
        return Err(ModelError::InvalidParameter(format!(
            "l1_ratio must be in [0, 1], got {}",
            l1_ratio
        )));
    }
    let eta0 = match config.learning_rate {
        crate::config::LearningRate::Constant { eta0 } => eta0,
        crate::config::LearningRate::InvScaling { eta0, .. } => eta0,
    };
    if !(eta0 > 0.0) {
        return Err(ModelError::InvalidParameter(format!(
            "eta0 must be positive, got {}",
            eta0
        )));
    }
    Ok(())
}
