use std::cmp::Ordering;

use ndarray::Array1;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::cross_validation::PerformanceCurve;
use crate::error::ModelError;

/// Area under the ROC curve.
///
/// Scores are ranked in descending order and tied scores are treated as one
/// threshold, so the curve takes a diagonal step across each tie group and
/// the area is integrated with the trapezoid rule.
///
/// # Arguments
///
/// * `labels` - Binary labels, values above 0.5 count as positives.
/// * `scores` - Scores to rank by; higher means more likely positive.
///
/// # Returns
///
/// The AUC in `[0, 1]`, or 0.5 when only one class is present.
pub fn auc(labels: &Array1<f64>, scores: &Array1<f64>) -> Result<f64, ModelError> {
    if labels.len() != scores.len() {
        return Err(ModelError::LengthMismatch {
            expected: labels.len(),
            found: scores.len(),
        });
    }

    let n_pos = labels.iter().filter(|&&l| l > 0.5).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        log::warn!(
            "AUC undefined for a single-class sample ({} positives, {} negatives); using 0.5",
            n_pos,
            n_neg
        );
        return Ok(0.5);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut prev_tp = 0.0;
    let mut prev_fp = 0.0;
    let mut area = 0.0;

    let mut i = 0;
    while i < order.len() {
        let score = scores[order[i]];
        while i < order.len() && scores[order[i]].total_cmp(&score) == Ordering::Equal {
            if labels[order[i]] > 0.5 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        area += (fp - prev_fp) * (tp + prev_tp) / 2.0;
        prev_tp = tp;
        prev_fp = fp;
    }

    Ok(area / (n_pos as f64 * n_neg as f64))
}

/// Iteration budget chosen from the per-fold held-out AUC curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoppingChoice {
    /// Best iteration count of each fold, in fold order.
    pub per_fold_best: Vec<usize>,
    pub selected: usize,
    /// Held-out AUC at `selected`, over the folds that recorded it.
    pub mean_auc: f64,
    pub std_auc: f64,
}

/// Pick the number of SGD iterations to train the final model with.
///
/// Each fold votes for the iteration count with its highest held-out AUC
/// (the earliest one on ties); the upper median of the votes wins.
///
/// # Returns
///
/// `None` when no curve has any recorded stage.
pub fn select_stopping_iteration(curves: &[PerformanceCurve]) -> Option<StoppingChoice> {
    let per_fold_best: Vec<usize> = curves
        .iter()
        .filter_map(|curve| curve.best().map(|(iterations, _)| iterations))
        .collect();
    if per_fold_best.is_empty() {
        return None;
    }

    let mut sorted = per_fold_best.clone();
    sorted.sort_unstable();
    let selected = sorted[sorted.len() / 2];

    let at_selected: Vec<f64> = curves
        .iter()
        .filter_map(|curve| curve.auc_at(selected))
        .collect();
    let mean_auc = at_selected.iter().mean();
    let std_auc = if at_selected.len() < 2 {
        0.0
    } else {
        at_selected.iter().std_dev()
    };

    log::debug!(
        "Per-fold best iterations {:?}, selected {}",
        per_fold_best,
        selected
    );

    Some(StoppingChoice {
        per_fold_best,
        selected,
        mean_auc,
        std_auc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(fold: usize, auc: Vec<f64>) -> PerformanceCurve {
        let iterations = (1..=auc.len()).map(|k| k * 10).collect();
        PerformanceCurve {
            fold,
            iterations,
            auc,
        }
    }

    #[test]
    fn perfect_and_inverted_rankings() {
        let labels = Array1::from(vec![0.0, 0.0, 1.0, 1.0]);
        let scores = Array1::from(vec![0.1, 0.2, 0.8, 0.9]);
        assert_eq!(auc(&labels, &scores).unwrap(), 1.0);
        let inverted = scores.mapv(|s| -s);
        assert_eq!(auc(&labels, &inverted).unwrap(), 0.0);
    }

    #[test]
    fn ties_count_half() {
        let labels = Array1::from(vec![0.0, 1.0]);
        let scores = Array1::from(vec![0.5, 0.5]);
        assert_eq!(auc(&labels, &scores).unwrap(), 0.5);

        let labels = Array1::from(vec![0.0, 0.0, 1.0, 1.0]);
        let scores = Array1::from(vec![0.1, 0.4, 0.35, 0.8]);
        assert!((auc(&labels, &scores).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn single_class_gives_half() {
        let labels = Array1::from(vec![1.0, 1.0]);
        let scores = Array1::from(vec![0.1, 0.9]);
        assert_eq!(auc(&labels, &scores).unwrap(), 0.5);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let labels = Array1::from(vec![1.0, 0.0]);
        let scores = Array1::from(vec![0.1]);
        assert!(matches!(
            auc(&labels, &scores),
            Err(ModelError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn stopping_iteration_is_upper_median_of_fold_bests() {
        let curves = vec![
            curve(0, vec![0.6, 0.9, 0.8]),
            curve(1, vec![0.7, 0.7, 0.95]),
            curve(2, vec![0.99, 0.5, 0.5]),
            curve(3, vec![0.5, 0.8, 0.8]),
        ];
        let choice = select_stopping_iteration(&curves).unwrap();
        assert_eq!(choice.per_fold_best, vec![20, 30, 10, 20]);
        assert_eq!(choice.selected, 20);
        let expected_mean = (0.9 + 0.7 + 0.5 + 0.8) / 4.0;
        assert!((choice.mean_auc - expected_mean).abs() < 1e-12);
        assert!(choice.std_auc > 0.0);
    }

    #[test]
    fn no_curves_no_choice() {
        assert!(select_stopping_iteration(&[]).is_none());
        assert!(select_stopping_iteration(&[curve(0, vec![])]).is_none());
    }

    #[test]
    fn single_fold_has_zero_spread() {
        let choice = select_stopping_iteration(&[curve(0, vec![0.5, 0.7])]).unwrap();
        assert_eq!(choice.selected, 20);
        assert_eq!(choice.std_auc, 0.0);
    }
}
