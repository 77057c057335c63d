mod common;

use insults_classifiers::config::CrossValidationConfig;
use insults_classifiers::cross_validation::{CrossValidator, KFold};
use insults_classifiers::error::ModelError;
use insults_classifiers::io::{self, AGGREGATE_FILE};
use proptest::prelude::*;
use tempfile::TempDir;

use common::{idiot_corpus, small_pipeline};

fn cv_config(n_splits: usize, parallel: bool) -> CrossValidationConfig {
    CrossValidationConfig {
        n_splits,
        parallel,
        ..CrossValidationConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Fold assignment
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn fifteen_folds_partition_every_index(n in 15usize..400, shuffle in any::<bool>(), seed in any::<u64>()) {
        let folds = KFold::new(15).with_shuffle(shuffle).with_seed(seed).split(n).unwrap();
        prop_assert_eq!(folds.len(), 15);

        let mut seen = vec![0usize; n];
        for fold in &folds {
            prop_assert!(!fold.test.is_empty());
            prop_assert_eq!(fold.train.len() + fold.test.len(), n);
            for &i in &fold.test {
                seen[i] += 1;
                prop_assert!(!fold.train.contains(&i));
            }
        }
        prop_assert!(seen.iter().all(|&count| count == 1));

        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }
}

#[test]
fn fewer_samples_than_folds_is_rejected() {
    assert!(matches!(
        KFold::new(15).split(10),
        Err(ModelError::InvalidFolds {
            n_samples: 10,
            n_splits: 15
        })
    ));
}

#[test]
fn split_is_reproducible() {
    let kfold = KFold::new(15).with_shuffle(true).with_seed(42);
    assert_eq!(kfold.split(100).unwrap(), kfold.split(100).unwrap());
}

// ---------------------------------------------------------------------------
// End-to-end cross-validation
// ---------------------------------------------------------------------------

#[test]
fn idiot_corpus_is_separable_on_held_out_folds() {
    let dir = TempDir::new().unwrap();
    let table = idiot_corpus();
    let validator = CrossValidator::new(small_pipeline(), cv_config(4, false));
    let summary = validator.run(&table, dir.path()).unwrap();

    assert_eq!(summary.folds.len(), 4);
    for (i, fold) in summary.folds.iter().enumerate() {
        assert_eq!(fold.fold, i);
        assert_eq!(fold.n_test, 5);
        assert_eq!(fold.curve.len(), 10);
        assert!(fold.artifact.ends_with(format!("fold{}.csv", i)));
    }

    let best_final = summary
        .curves
        .iter()
        .map(|c| c.auc[c.auc.len() - 1])
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(best_final > 0.9, "best final-stage auc {}", best_final);

    let selected = summary.selected_iterations().unwrap();
    assert_eq!(selected % 5, 0);
    assert!(selected >= 5 && selected <= 50);
}

#[test]
fn artifacts_on_disk_match_the_summary() {
    let dir = TempDir::new().unwrap();
    let table = idiot_corpus();
    let validator = CrossValidator::new(small_pipeline(), cv_config(4, false));
    let summary = validator.run(&table, dir.path()).unwrap();

    for fold in &summary.folds {
        let curve = io::read_fold_curve(&fold.artifact).unwrap();
        assert_eq!(curve, fold.curve);
    }
    assert!(dir.path().join(AGGREGATE_FILE).exists());
    assert_eq!(io::collect_fold_curves(dir.path()).unwrap(), summary.aggregate);
    assert_eq!(summary.aggregate.columns.len(), 4);
}

#[test]
fn parallel_folds_give_the_same_curves() {
    let table = idiot_corpus();
    let sequential_dir = TempDir::new().unwrap();
    let parallel_dir = TempDir::new().unwrap();

    let sequential = CrossValidator::new(small_pipeline(), cv_config(4, false))
        .run(&table, sequential_dir.path())
        .unwrap();
    let parallel = CrossValidator::new(small_pipeline(), cv_config(4, true))
        .run(&table, parallel_dir.path())
        .unwrap();

    assert_eq!(sequential.curves, parallel.curves);
    assert_eq!(sequential.stopping, parallel.stopping);
}

#[test]
fn fold_failure_names_the_fold() {
    let dir = TempDir::new().unwrap();
    let mut table = idiot_corpus();
    // blank comments leave nothing to build a vocabulary from
    for comment in table.comments.iter_mut() {
        comment.clear();
    }
    let err = CrossValidator::new(small_pipeline(), cv_config(4, false))
        .run(&table, dir.path())
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("fold 0"), "{}", message);
    assert!(message.contains("feature extraction"), "{}", message);
}
