//! TF-IDF re-weighting of count matrices.
//!
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1   (smooth_idf)
//! idf(t) = ln(n / df(t)) + 1               (otherwise)
//!
//! With `sublinear_tf` the term frequency is replaced by `1 + ln(tf)`.
use ndarray::Array1;
use sprs::CsMat;

use crate::config::{Norm, TfidfConfig};
use crate::error::ModelError;
use crate::models::traits::SparseTransform;
use crate::sparse::{document_frequency, CsrBuilder};

#[derive(Debug, Clone)]
pub struct TfidfTransformer {
    config: TfidfConfig,
    idf: Option<Array1<f64>>,
}

impl TfidfTransformer {
    pub fn new(config: TfidfConfig) -> Self {
        TfidfTransformer { config, idf: None }
    }

    pub fn idf(&self) -> Option<&Array1<f64>> {
        self.idf.as_ref()
    }

    fn compute_idf(&self, x: &CsMat<f64>) -> Result<Array1<f64>, ModelError> {
        if x.rows() == 0 {
            return Err(ModelError::EmptyInput("count matrix"));
        }
        let smooth = if self.config.smooth_idf { 1.0 } else { 0.0 };
        let n_samples = x.rows() as f64 + smooth;
        let idf = document_frequency(x)
            .into_iter()
            .map(|df| {
                let df = df as f64 + smooth;
                if df > 0.0 {
                    (n_samples / df).ln() + 1.0
                } else {
                    // Column never observed; any weight works since it is always zero.
                    1.0
                }
            })
            .collect();
        Ok(idf)
    }

    fn weight_row(&self, entries: &mut [(usize, f64)], idf: &Array1<f64>) {
        for (col, value) in entries.iter_mut() {
            let tf = if self.config.sublinear_tf && *value > 0.0 {
                1.0 + value.ln()
            } else {
                *value
            };
            *value = tf * idf[*col];
        }

        let norm = match self.config.norm {
            Norm::None => return,
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
        };
        if norm > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= norm;
            }
        }
    }
}

impl SparseTransform for TfidfTransformer {
    fn name(&self) -> &str {
        "tfidf"
    }

    fn fit(&mut self, x: &CsMat<f64>, _y: &Array1<f64>) -> Result<(), ModelError> {
        self.idf = Some(self.compute_idf(x)?);
        Ok(())
    }

    fn transform(&self, x: &CsMat<f64>) -> Result<CsMat<f64>, ModelError> {
        let idf = self.idf.as_ref().ok_or(ModelError::NotFitted("tfidf transformer"))?;
        if x.cols() != idf.len() {
            return Err(ModelError::DimensionMismatch {
                expected: idf.len(),
                found: x.cols(),
            });
        }

        let mut builder = CsrBuilder::with_capacity(x.cols(), x.rows(), x.nnz());
        for row in x.outer_iterator() {
            let mut entries: Vec<(usize, f64)> = row.iter().map(|(c, &v)| (c, v)).collect();
            self.weight_row(&mut entries, idf);
            builder.push_row(entries);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> CsMat<f64> {
        // two documents, three terms; term 0 appears everywhere
        let mut builder = CsrBuilder::new(3);
        builder.push_row(vec![(0, 1.0), (1, 3.0)]);
        builder.push_row(vec![(0, 2.0), (2, 1.0)]);
        builder.build()
    }

    fn labels() -> Array1<f64> {
        Array1::from(vec![0.0, 1.0])
    }

    #[test]
    fn smooth_idf_matches_formula() {
        let mut t = TfidfTransformer::new(TfidfConfig::default());
        t.fit(&counts(), &labels()).unwrap();
        let idf = t.idf().unwrap();
        assert!((idf[0] - 1.0).abs() < 1e-12);
        let expected = (3.0f64 / 2.0).ln() + 1.0;
        assert!((idf[1] - expected).abs() < 1e-12);
        assert!((idf[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn rows_are_l2_normalised() {
        let mut t = TfidfTransformer::new(TfidfConfig::default());
        let x = t.fit_transform(&counts(), &labels()).unwrap();
        for row in x.outer_iterator() {
            let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sublinear_tf_dampens_repeated_terms() {
        let config = TfidfConfig {
            sublinear_tf: true,
            smooth_idf: false,
            norm: Norm::None,
        };
        let mut t = TfidfTransformer::new(config);
        let x = t.fit_transform(&counts(), &labels()).unwrap();
        let row: Vec<(usize, f64)> = x.outer_view(0).unwrap().iter().map(|(c, &v)| (c, v)).collect();
        let idf1 = 2.0f64.ln() + 1.0;
        assert!((row[0].1 - 1.0).abs() < 1e-12);
        assert!((row[1].1 - (1.0 + 3.0f64.ln()) * idf1).abs() < 1e-12);
    }

    #[test]
    fn transform_checks_column_count() {
        let mut t = TfidfTransformer::new(TfidfConfig::default());
        t.fit(&counts(), &labels()).unwrap();
        let other = CsrBuilder::new(5).build();
        assert_eq!(
            t.transform(&other).unwrap_err(),
            ModelError::DimensionMismatch { expected: 3, found: 5 }
        );
    }

    #[test]
    fn transform_before_fit_is_an_error() {
        let t = TfidfTransformer::new(TfidfConfig::default());
        assert!(matches!(t.transform(&counts()), Err(ModelError::NotFitted(_))));
    }
}
