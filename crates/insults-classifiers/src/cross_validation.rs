//! K-fold cross-validation of the staged pipeline.
//!
//! Every fold fits a fresh pipeline on the training part, scores every stage
//! on the held-out part and saves the resulting AUC curve. The curves are
//! joined on the iteration count and used to choose the iteration budget of
//! the final model.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{CrossValidationConfig, PipelineConfig};
use crate::error::ModelError;
use crate::io::{self, CommentTable};
use crate::pipeline::Pipeline;
use crate::stats::{select_stopping_iteration, StoppingChoice};

/// Train/test indices of one fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub index: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold splitter.
///
/// Splits `0..n` into `n_splits` consecutive blocks; the first `n % n_splits`
/// blocks get one extra element. With `shuffle` the indices are permuted by a
/// seeded RNG first.
#[derive(Debug, Clone, PartialEq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        KFold {
            n_splits,
            shuffle: false,
            seed: 0,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn from_config(config: &CrossValidationConfig) -> Self {
        KFold::new(config.n_splits)
            .with_shuffle(config.shuffle)
            .with_seed(config.seed)
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, ModelError> {
        if self.n_splits < 2 || n_samples < self.n_splits {
            return Err(ModelError::InvalidFolds {
                n_samples,
                n_splits: self.n_splits,
            });
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for index in 0..self.n_splits {
            let size = base + usize::from(index < remainder);
            let end = start + size;

            let mut test = indices[start..end].to_vec();
            let mut train: Vec<usize> = indices[..start]
                .iter()
                .chain(&indices[end..])
                .copied()
                .collect();
            test.sort_unstable();
            train.sort_unstable();

            log::trace!("fold {}: test indices {:?}", index, test);
            folds.push(Fold { index, train, test });
            start = end;
        }
        Ok(folds)
    }
}

/// Held-out AUC of every stage of one fold's model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceCurve {
    pub fold: usize,
    pub iterations: Vec<usize>,
    pub auc: Vec<f64>,
}

impl PerformanceCurve {
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Iteration count with the highest AUC; the earliest stage wins ties.
    pub fn best(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (&iterations, &auc) in self.iterations.iter().zip(&self.auc) {
            match best {
                Some((_, best_auc)) if auc <= best_auc => {}
                _ if auc.is_nan() => {}
                _ => best = Some((iterations, auc)),
            }
        }
        best
    }

    pub fn auc_at(&self, iterations: usize) -> Option<f64> {
        self.iterations
            .iter()
            .position(|&i| i == iterations)
            .map(|pos| self.auc[pos])
    }
}

/// Fold curves outer-joined on the iteration count.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregateTable {
    /// Ascending iteration counts.
    pub iterations: Vec<usize>,
    /// `(auc{i}, values)` per fold; `None` where a fold has no value.
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl AggregateTable {
    pub fn from_curves(curves: &[PerformanceCurve]) -> Self {
        let mut iterations: Vec<usize> = curves
            .iter()
            .flat_map(|c| c.iterations.iter().copied())
            .collect();
        iterations.sort_unstable();
        iterations.dedup();

        let columns = curves
            .iter()
            .map(|curve| {
                let values = iterations.iter().map(|&it| curve.auc_at(it)).collect();
                (io::folds::auc_column_name(curve.fold), values)
            })
            .collect();

        AggregateTable {
            iterations,
            columns,
        }
    }

    pub fn get(&self, column: &str, iterations: usize) -> Option<f64> {
        let row = self.iterations.iter().position(|&i| i == iterations)?;
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, values)| values[row])
    }
}

impl fmt::Display for AggregateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", io::folds::ITERATIONS_COLUMN)?;
        for (name, _) in &self.columns {
            write!(f, " {:>9}", name)?;
        }
        writeln!(f)?;
        for (row, iterations) in self.iterations.iter().enumerate() {
            write!(f, "{:>10}", iterations)?;
            for (_, values) in &self.columns {
                match values[row] {
                    Some(v) => write!(f, " {:>9.6}", v)?,
                    None => write!(f, " {:>9}", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldReport {
    pub fold: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// AUC of the final stage on the fold's own training rows.
    pub train_auc: f64,
    pub curve: PerformanceCurve,
    pub artifact: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationSummary {
    pub folds: Vec<FoldReport>,
    pub curves: Vec<PerformanceCurve>,
    pub aggregate: AggregateTable,
    pub aggregate_path: PathBuf,
    pub stopping: Option<StoppingChoice>,
}

impl CrossValidationSummary {
    pub fn selected_iterations(&self) -> Option<usize> {
        self.stopping.as_ref().map(|choice| choice.selected)
    }
}

/// Runs K-fold cross-validation of the staged pipeline.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    pipeline: PipelineConfig,
    config: CrossValidationConfig,
}

impl CrossValidator {
    pub fn new(pipeline: PipelineConfig, config: CrossValidationConfig) -> Self {
        CrossValidator { pipeline, config }
    }

    fn run_fold(&self, table: &CommentTable, fold: &Fold, folds_dir: &Path) -> Result<FoldReport> {
        log::info!("fold {}", fold.index);
        let train = table.select(&fold.train);
        let test = table.select(&fold.test);
        let y_train = train.require_labels()?;
        let y_test = test.require_labels()?;

        let mut pipeline = Pipeline::from_config(&self.pipeline)?;
        pipeline.fit(&train.comments, y_train)?;
        let train_auc = pipeline.final_model().auc(&pipeline.transform(&train.comments)?, y_train)?;
        log::info!("fold {}: training auc {:.6}", fold.index, train_auc);

        let (iterations, auc) = pipeline.staged_auc(&test.comments, y_test)?;
        let curve = PerformanceCurve {
            fold: fold.index,
            iterations,
            auc,
        };
        if let Some((best_iterations, best_auc)) = curve.best() {
            log::info!(
                "fold {}: best held-out auc {:.6} at {} iterations",
                fold.index,
                best_auc,
                best_iterations
            );
        }

        let artifact = io::write_fold_curve(folds_dir, &curve)?;
        log::info!("saved info for fold {}", fold.index);

        Ok(FoldReport {
            fold: fold.index,
            n_train: fold.train.len(),
            n_test: fold.test.len(),
            train_auc,
            curve,
            artifact,
        })
    }

    /// Evaluate every fold, save the curves under `folds_dir` and choose the
    /// iteration budget.
    pub fn run<P: AsRef<Path>>(&self, table: &CommentTable, folds_dir: P) -> Result<CrossValidationSummary> {
        let folds_dir = folds_dir.as_ref();
        table.require_labels()?;
        let folds = KFold::from_config(&self.config)
            .split(table.len())
            .context("Failed to split comments into folds")?;
        log::info!(
            "Cross-validating {} comments over {} folds",
            table.len(),
            folds.len()
        );

        let evaluate = |fold: &Fold| {
            self.run_fold(table, fold, folds_dir)
                .with_context(|| format!("fold {}", fold.index))
        };
        let reports: Vec<FoldReport> = if self.config.parallel {
            folds.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            folds.iter().map(evaluate).collect::<Result<_>>()?
        };

        // Join what is on disk, so the table reflects the saved artifacts.
        let curves = reports
            .iter()
            .map(|report| io::read_fold_curve(&report.artifact))
            .collect::<Result<Vec<_>>>()?;
        let aggregate = AggregateTable::from_curves(&curves);
        let aggregate_path = folds_dir.join(io::AGGREGATE_FILE);
        io::write_aggregate(&aggregate_path, &aggregate)?;
        log::info!("Held-out AUC by iteration count:\n{}", aggregate);

        let stopping = select_stopping_iteration(&curves);
        match &stopping {
            Some(choice) => log::info!(
                "Selected {} iterations (held-out auc {:.4} +/- {:.4})",
                choice.selected,
                choice.mean_auc,
                choice.std_auc
            ),
            None => log::warn!("No stage recorded in any fold; no iteration count selected"),
        }

        Ok(CrossValidationSummary {
            folds: reports,
            curves,
            aggregate,
            aggregate_path,
            stopping,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_folds_take_the_remainder() {
        let folds = KFold::new(3).split(10).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(folds[0].test, vec![0, 1, 2, 3]);
        assert_eq!(folds[1].train, vec![0, 1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn too_few_samples_is_an_error() {
        assert_eq!(
            KFold::new(15).split(14).unwrap_err(),
            ModelError::InvalidFolds {
                n_samples: 14,
                n_splits: 15
            }
        );
        assert!(KFold::new(1).split(10).is_err());
    }

    #[test]
    fn shuffled_split_is_deterministic_per_seed() {
        let a = KFold::new(4).with_shuffle(true).with_seed(7).split(20).unwrap();
        let b = KFold::new(4).with_shuffle(true).with_seed(7).split(20).unwrap();
        assert_eq!(a, b);
        let plain = KFold::new(4).split(20).unwrap();
        assert_ne!(a, plain);
    }

    #[test]
    fn best_prefers_earliest_maximum() {
        let curve = PerformanceCurve {
            fold: 0,
            iterations: vec![10, 20, 30],
            auc: vec![0.8, 0.9, 0.9],
        };
        assert_eq!(curve.best(), Some((20, 0.9)));
        assert_eq!(curve.auc_at(30), Some(0.9));
        assert_eq!(curve.auc_at(40), None);
    }

    #[test]
    fn aggregate_is_an_outer_join() {
        let curves = vec![
            PerformanceCurve {
                fold: 0,
                iterations: vec![10, 20],
                auc: vec![0.5, 0.6],
            },
            PerformanceCurve {
                fold: 1,
                iterations: vec![20, 30],
                auc: vec![0.7, 0.8],
            },
        ];
        let table = AggregateTable::from_curves(&curves);
        assert_eq!(table.iterations, vec![10, 20, 30]);
        assert_eq!(table.columns[0].1, vec![Some(0.5), Some(0.6), None]);
        assert_eq!(table.columns[1].1, vec![None, Some(0.7), Some(0.8)]);
        assert_eq!(table.get("auc1", 30), Some(0.8));
        assert!(table.to_string().contains("NaN"));
    }
}
