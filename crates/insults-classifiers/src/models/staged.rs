//! SGD regressor trained in fixed-size steps, keeping a snapshot after each.
//!
//! Every step runs `step_size` epochs of constant-rate SGD warm-started from
//! the previous step, so stage `k` holds the model after `k * step_size`
//! epochs. The snapshots let cross-validation evaluate every iteration budget
//! from a single fit.
use ndarray::Array1;
use sprs::CsMat;

use crate::config::StagedConfig;
use crate::error::ModelError;
use crate::models::sgd::{linear_decision, validate_sgd_config, ModelState, SgdRegressor};
use crate::models::traits::{Regressor, StagedModel};
use crate::preprocessing::scale_predictions;
use crate::stats::auc;

/// Owned copy of the model after `iterations` epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub iterations: usize,
    pub coef: Array1<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone)]
pub struct StagedRegressor {
    config: StagedConfig,
    state: ModelState,
    stages: Vec<Stage>,
}

fn validate_steps(step_size: usize, total_iterations: usize) -> Result<(), ModelError> {
    if step_size == 0 || total_iterations == 0 || total_iterations % step_size != 0 {
        return Err(ModelError::InvalidStepSize {
            step_size,
            total_iterations,
        });
    }
    Ok(())
}

impl StagedRegressor {
    pub fn new(config: StagedConfig) -> Result<Self, ModelError> {
        validate_steps(config.step_size, config.total_iterations)?;
        validate_sgd_config(&config.step_sgd_config())?;
        Ok(StagedRegressor {
            config,
            state: ModelState::Uninitialized,
            stages: Vec::new(),
        })
    }

    pub fn config(&self) -> &StagedConfig {
        &self.config
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    /// Number of steps the next `fit` will run.
    pub fn n_steps(&self) -> usize {
        self.config.total_iterations / self.config.step_size
    }

    /// Change the epoch budget used by the next `fit`.
    pub fn set_total_iterations(&mut self, total_iterations: usize) -> Result<(), ModelError> {
        validate_steps(self.config.step_size, total_iterations)?;
        self.config.total_iterations = total_iterations;
        Ok(())
    }

    fn fit_steps(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let n_steps = self.n_steps();
        let base = self.config.step_sgd_config();

        for step in 0..n_steps {
            let mut step_config = base.clone();
            step_config.seed = base.seed.wrapping_add(step as u64);
            let mut sgd = SgdRegressor::new(step_config)?;

            let init = std::mem::take(&mut self.state);
            sgd.fit_from(x, y, init)?;
            self.state = sgd.into_state();

            let (coef, intercept) = match &self.state {
                ModelState::Warm { coef, intercept } => (coef.clone(), *intercept),
                ModelState::Uninitialized => return Err(ModelError::NotFitted("SGD step")),
            };
            let iterations = (step + 1) * self.config.step_size;
            let train_auc = auc(y, &scale_predictions(linear_decision(x, &coef, intercept)?))?;
            self.stages.push(Stage {
                iterations,
                coef,
                intercept,
            });

            log::info!("done {}/{} steps", step + 1, n_steps);
            log::info!("training set auc {:.6}", train_auc);
        }
        Ok(())
    }

    /// Scaled predictions, optionally from caller-supplied weights.
    ///
    /// `coef` and `intercept` must be given together or not at all; the
    /// stored model is never modified.
    pub fn predict_with(
        &self,
        x: &CsMat<f64>,
        coef: Option<&Array1<f64>>,
        intercept: Option<f64>,
    ) -> Result<Array1<f64>, ModelError> {
        let (coef, intercept) = match (coef, intercept) {
            (Some(coef), Some(intercept)) => (coef, intercept),
            (None, None) => match &self.state {
                ModelState::Warm { coef, intercept } => (coef, *intercept),
                ModelState::Uninitialized => {
                    return Err(ModelError::NotFitted("staged regressor"))
                }
            },
            _ => return Err(ModelError::PartialOverride),
        };
        Ok(scale_predictions(linear_decision(x, coef, intercept)?))
    }

    /// Scaled predictions of every stage, in stage order.
    ///
    /// Each stage is scored when the iterator reaches it.
    pub fn staged_predict<'a>(
        &'a self,
        x: &'a CsMat<f64>,
    ) -> Result<impl Iterator<Item = Result<(usize, Array1<f64>), ModelError>> + 'a, ModelError>
    {
        if self.stages.is_empty() {
            return Err(ModelError::NotFitted("staged regressor"));
        }
        Ok(self.stages.iter().map(move |stage| {
            let raw = linear_decision(x, &stage.coef, stage.intercept)?;
            Ok((stage.iterations, scale_predictions(raw)))
        }))
    }

    /// ROC AUC of the current model on `(x, y)`.
    pub fn auc(&self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<f64, ModelError> {
        auc(y, &self.predict(x)?)
    }
}

impl Regressor for StagedRegressor {
    fn fit(&mut self, x: &CsMat<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        self.state = ModelState::Uninitialized;
        self.stages.clear();
        let result = self.fit_steps(x, y);
        if result.is_err() {
            self.state = ModelState::Uninitialized;
            self.stages.clear();
        }
        result
    }

    fn predict(&self, x: &CsMat<f64>) -> Result<Array1<f64>, ModelError> {
        self.predict_with(x, None, None)
    }

    fn name(&self) -> &str {
        "staged"
    }
}

impl StagedModel for StagedRegressor {
    fn staged_auc(
        &self,
        x: &CsMat<f64>,
        y: &Array1<f64>,
    ) -> Result<(Vec<usize>, Vec<f64>), ModelError> {
        let mut iterations = Vec::with_capacity(self.stages.len());
        let mut aucs = Vec::with_capacity(self.stages.len());
        for stage in self.staged_predict(x)? {
            let (iters, predictions) = stage?;
            iterations.push(iters);
            aucs.push(auc(y, &predictions)?);
        }
        Ok((iterations, aucs))
    }
}
