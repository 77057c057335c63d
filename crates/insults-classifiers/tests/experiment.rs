mod common;

use insults_classifiers::config::{CrossValidationConfig, ExperimentConfig};
use insults_classifiers::experiment::{run_cross_validation, run_experiment, run_submission};
use insults_classifiers::io::read_comment_table;
use tempfile::TempDir;

use common::{idiot_corpus, read_to_string, small_pipeline, write_test_csvs, write_train_csv};

fn experiment_in(dir: &TempDir) -> ExperimentConfig {
    let root = dir.path();
    let config = ExperimentConfig {
        train_file: root.join("Data/train.csv"),
        test_file: root.join("Data/test.csv"),
        sample_submission_file: root.join("Data/sample_submission_null.csv"),
        folds_dir: root.join("Folds"),
        submissions_dir: root.join("submissions"),
        report_file: Some(root.join("report.html")),
        pipeline: small_pipeline(),
        cross_validation: CrossValidationConfig {
            n_splits: 4,
            ..CrossValidationConfig::default()
        },
    };
    std::fs::create_dir_all(root.join("Data")).unwrap();
    write_train_csv(&config.train_file, &idiot_corpus());
    write_test_csvs(
        &config.test_file,
        &config.sample_submission_file,
        &["you idiot", "lovely weather", "what a song"],
    );
    config
}

#[test]
fn full_run_writes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let config = experiment_in(&dir);

    let outcome = run_experiment(&config).unwrap();
    assert_eq!(Some(outcome.total_iterations), outcome.summary.selected_iterations());
    for fold in 0..4 {
        assert!(config.folds_dir.join(format!("fold{}.csv", fold)).exists());
    }
    assert!(config.folds_dir.join("aggregate.csv").exists());

    let report = read_to_string(outcome.report.as_ref().unwrap());
    assert!(report.contains("Selected iterations"));
    assert!(report.contains("auc3"));

    assert!(outcome.submission.ends_with("submission1.csv"));
    let submission = read_comment_table(&outcome.submission).unwrap();
    assert_eq!(submission.comments, vec!["you idiot", "lovely weather", "what a song"]);
}

#[test]
fn submissions_are_numbered_across_runs() {
    let dir = TempDir::new().unwrap();
    let config = experiment_in(&dir);

    let first = run_submission(&config, 10).unwrap();
    let second = run_submission(&config, 20).unwrap();
    assert_ne!(first, second);
    assert!(first.exists() && second.exists());
}

#[test]
fn cross_validation_without_report() {
    let dir = TempDir::new().unwrap();
    let mut config = experiment_in(&dir);
    config.report_file = None;

    let summary = run_cross_validation(&config).unwrap();
    assert_eq!(summary.folds.len(), 4);
    assert!(!dir.path().join("report.html").exists());
}

#[test]
fn invalid_iteration_budget_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = experiment_in(&dir);
    let err = run_submission(&config, 12).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("positive multiple of step_size"), "{}", message);
}
