//! The whole experiment: cross-validate, pick an iteration budget, refit on
//! all training comments and write a numbered submission.
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::ExperimentConfig;
use crate::cross_validation::{CrossValidationSummary, CrossValidator};
use crate::io::{self, CommentTable};
use crate::pipeline::Pipeline;
use crate::report::write_cv_report;

#[derive(Debug)]
pub struct ExperimentOutcome {
    pub summary: CrossValidationSummary,
    /// Iteration budget the final model was trained with.
    pub total_iterations: usize,
    pub report: Option<PathBuf>,
    pub submission: PathBuf,
}

fn cross_validate(config: &ExperimentConfig, train: &CommentTable) -> Result<CrossValidationSummary> {
    let validator = CrossValidator::new(config.pipeline.clone(), config.cross_validation.clone());
    validator.run(train, &config.folds_dir)
}

fn write_report(config: &ExperimentConfig, summary: &CrossValidationSummary) -> Result<Option<PathBuf>> {
    match &config.report_file {
        Some(path) => {
            write_cv_report(path, summary, config)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            Ok(Some(path.clone()))
        }
        None => Ok(None),
    }
}

fn submit(config: &ExperimentConfig, train: &CommentTable, total_iterations: usize) -> Result<PathBuf> {
    let start = Instant::now();
    let mut pipeline = Pipeline::from_config(&config.pipeline)?;
    pipeline
        .final_model_mut()
        .set_total_iterations(total_iterations)
        .context("Invalid iteration budget for the final model")?;

    log::info!(
        "Training final model on {} comments for {} iterations",
        train.len(),
        total_iterations
    );
    pipeline
        .fit(&train.comments, train.require_labels()?)
        .context("Failed to fit final model")?;

    let leaderboard = io::read_comment_table(&config.test_file)?;
    let predictions = pipeline
        .predict(&leaderboard.comments)
        .context("Failed to score leaderboard comments")?;
    let path = io::write_submission(
        &config.sample_submission_file,
        &predictions,
        &config.submissions_dir,
    )?;
    log::info!("Final model trained and scored in {:?}", start.elapsed());
    Ok(path)
}

/// Cross-validate the configured pipeline on the training table, writing
/// the fold artifacts and, when configured, the HTML report.
pub fn run_cross_validation(config: &ExperimentConfig) -> Result<CrossValidationSummary> {
    let train = io::read_training_table(&config.train_file)?;
    let summary = cross_validate(config, &train)?;
    write_report(config, &summary)?;
    Ok(summary)
}

/// Train on every training comment for `total_iterations` epochs and write
/// a submission for the leaderboard comments.
pub fn run_submission(config: &ExperimentConfig, total_iterations: usize) -> Result<PathBuf> {
    let train = io::read_training_table(&config.train_file)?;
    submit(config, &train, total_iterations)
}

pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentOutcome> {
    let start = Instant::now();
    let train = io::read_training_table(&config.train_file)?;

    let summary = cross_validate(config, &train)?;
    let total_iterations = match summary.selected_iterations() {
        Some(selected) => selected,
        None => {
            let fallback = config.pipeline.regressor.total_iterations;
            log::warn!(
                "No iteration count selected; using the configured {} iterations",
                fallback
            );
            fallback
        }
    };
    let report = write_report(config, &summary)?;
    let submission = submit(config, &train, total_iterations)?;

    log::info!("Experiment finished in {:?}", start.elapsed());
    Ok(ExperimentOutcome {
        summary,
        total_iterations,
        report,
        submission,
    })
}
