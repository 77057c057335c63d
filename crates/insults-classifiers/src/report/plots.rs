use plotly::common::{Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};

use crate::cross_validation::PerformanceCurve;
use crate::stats::StoppingChoice;

/// Held-out AUC against iteration count, one line per fold.
pub fn plot_staged_auc(curves: &[PerformanceCurve]) -> Plot {
    let mut plot = Plot::new();
    for curve in curves {
        let x: Vec<f64> = curve.iterations.iter().map(|&i| i as f64).collect();
        plot.add_trace(
            Scatter::new(x, curve.auc.clone())
                .name(format!("fold {}", curve.fold))
                .mode(Mode::Lines),
        );
    }

    plot.set_layout(
        Layout::new()
            .title("Held-out AUC by SGD Iterations")
            .x_axis(Axis::new().title("Iterations"))
            .y_axis(Axis::new().title("AUC")),
    );
    plot
}

/// Per-fold best iteration counts with the selected budget as a reference line.
pub fn plot_fold_best(choice: &StoppingChoice) -> Plot {
    let folds: Vec<f64> = (0..choice.per_fold_best.len()).map(|i| i as f64).collect();
    let best: Vec<f64> = choice.per_fold_best.iter().map(|&i| i as f64).collect();
    let selected = vec![choice.selected as f64; folds.len()];

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(folds.clone(), best)
            .name("Best iterations")
            .mode(Mode::Markers),
    );
    plot.add_trace(
        Scatter::new(folds, selected)
            .name("Selected")
            .mode(Mode::Lines)
            .line(Line::new().color("rgba(255, 127, 14, 1.0)")),
    );
    plot.set_layout(
        Layout::new()
            .title("Best Iteration Count per Fold")
            .x_axis(Axis::new().title("Fold"))
            .y_axis(Axis::new().title("Iterations")),
    );
    plot
}
