//! Post-processing of raw regressor outputs.
//!
//! Regressor outputs are unbounded; submissions and AUC curves work on
//! per-batch min-max scaled scores in `[0, 1]`.
use ndarray::Array1;

/// Score assigned to every element of a batch whose range is degenerate.
pub const DEGENERATE_FILL: f64 = 0.5;

/// Min-max scale a batch of raw scores into `[0, 1]`.
///
/// A batch with a zero or empty range, or with an infinite bound, is filled
/// with [`DEGENERATE_FILL`]. NaN inputs also map to [`DEGENERATE_FILL`].
/// Finite batches whose range overflows are scaled on halved values.
///
/// # Arguments
///
/// * `raw` - Raw regressor outputs for one batch.
///
/// # Returns
///
/// The scaled batch, same length as `raw`.
pub fn scale_predictions(mut raw: Array1<f64>) -> Array1<f64> {
    let (min, max) = raw
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    // Halving is exact, so it keeps the ordering when `max - min` overflows.
    let halve = min.is_finite() && max.is_finite() && !(max - min).is_finite();
    let factor = if halve { 0.5 } else { 1.0 };
    let (min, max) = (min * factor, max * factor);
    let range = max - min;

    if raw.len() < 2 || !range.is_finite() || range <= 0.0 {
        if !raw.is_empty() {
            log::warn!(
                "Degenerate prediction batch of {} values (min {}, max {}); filling with {}",
                raw.len(),
                min,
                max,
                DEGENERATE_FILL
            );
        }
        raw.fill(DEGENERATE_FILL);
        return raw;
    }

    raw.mapv_inplace(|v| {
        if v.is_nan() {
            DEGENERATE_FILL
        } else {
            ((v * factor - min) / range).clamp(0.0, 1.0)
        }
    });
    raw
}
