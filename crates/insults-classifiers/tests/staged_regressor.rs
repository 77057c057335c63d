use insults_classifiers::config::{Penalty, StagedConfig};
use insults_classifiers::error::ModelError;
use insults_classifiers::models::{Regressor, StagedModel, StagedRegressor};
use insults_classifiers::preprocessing::{scale_predictions, DEGENERATE_FILL};
use insults_classifiers::sparse::CsrBuilder;
use ndarray::Array1;
use proptest::prelude::*;
use sprs::CsMat;

fn config(step_size: usize, total_iterations: usize) -> StagedConfig {
    StagedConfig {
        step_size,
        total_iterations,
        alpha: 1e-6,
        penalty: Penalty::L2,
        eta0: 0.05,
        ..StagedConfig::default()
    }
}

fn toy_data() -> (CsMat<f64>, Array1<f64>) {
    let mut builder = CsrBuilder::new(4);
    let mut labels = Vec::new();
    for i in 0..16 {
        if i % 2 == 0 {
            builder.push_row(vec![(0, 1.0), (3, 0.2)]);
            labels.push(1.0);
        } else {
            builder.push_row(vec![(1, 0.7), (2, 0.7)]);
            labels.push(0.0);
        }
    }
    (builder.build(), Array1::from(labels))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn rejects_budget_not_divisible_by_step() {
    let err = StagedRegressor::new(config(10, 1605)).unwrap_err();
    assert_eq!(
        err,
        ModelError::InvalidStepSize {
            step_size: 10,
            total_iterations: 1605
        }
    );
}

#[test]
fn default_configuration_is_valid() {
    let model = StagedRegressor::new(StagedConfig::default()).unwrap();
    assert_eq!(model.n_steps(), 160);
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[test]
fn stage_iterations_are_cumulative_multiples_of_step() {
    let (x, y) = toy_data();
    let mut model = StagedRegressor::new(config(10, 40)).unwrap();
    model.fit(&x, &y).unwrap();
    assert_eq!(model.n_stages(), 4);
    let iterations: Vec<usize> = model.stages().iter().map(|s| s.iterations).collect();
    assert_eq!(iterations, vec![10, 20, 30, 40]);
}

#[test]
fn staged_outputs_align_with_stages() {
    let (x, y) = toy_data();
    let mut model = StagedRegressor::new(config(5, 15)).unwrap();
    model.fit(&x, &y).unwrap();

    let staged: Vec<(usize, Array1<f64>)> = model
        .staged_predict(&x)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(staged.len(), model.n_stages());
    let (iterations, aucs) = model.staged_auc(&x, &y).unwrap();
    assert_eq!(iterations.len(), aucs.len());
    assert_eq!(iterations.len(), model.n_stages());

    // the last stage is the live model
    let last = &staged[staged.len() - 1].1;
    assert_eq!(last, &model.predict(&x).unwrap());
}

#[test]
fn overriding_only_the_intercept_fails_without_side_effects() {
    let (x, y) = toy_data();
    let mut model = StagedRegressor::new(config(5, 10)).unwrap();
    model.fit(&x, &y).unwrap();
    let before = model.predict(&x).unwrap();
    assert_eq!(
        model.predict_with(&x, None, Some(3.0)).unwrap_err(),
        ModelError::PartialOverride
    );
    assert_eq!(model.predict(&x).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Prediction scaling
// ---------------------------------------------------------------------------

#[test]
fn constant_scores_scale_to_half() {
    let scaled = scale_predictions(Array1::from(vec![3.0, 3.0, 3.0]));
    assert_eq!(scaled.to_vec(), vec![0.5, 0.5, 0.5]);
}

#[test]
fn zero_weights_give_degenerate_batch() {
    let (x, y) = toy_data();
    let mut model = StagedRegressor::new(config(5, 5)).unwrap();
    model.fit(&x, &y).unwrap();
    let zeros = Array1::zeros(4);
    let pred = model.predict_with(&x, Some(&zeros), Some(0.0)).unwrap();
    assert!(pred.iter().all(|&p| p == DEGENERATE_FILL));
}

proptest! {
    #[test]
    fn scaled_predictions_stay_in_unit_interval(raw in prop::collection::vec(-1e6f64..1e6, 0..64)) {
        let n = raw.len();
        let scaled = scale_predictions(Array1::from(raw));
        prop_assert_eq!(scaled.len(), n);
        for p in scaled.iter() {
            prop_assert!((0.0..=1.0).contains(p));
        }
    }

    #[test]
    fn scaling_hits_both_ends_of_non_constant_batches(
        raw in prop::collection::vec(-1e3f64..1e3, 2..32)
    ) {
        let min = raw.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(max > min);
        let scaled = scale_predictions(Array1::from(raw));
        prop_assert!(scaled.iter().any(|&p| p == 0.0));
        prop_assert!(scaled.iter().any(|&p| p == 1.0));
    }
}
