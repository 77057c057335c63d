use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use insults_classifiers::config::ExperimentConfig;

use crate::util::validate_tsv_or_csv_file;

/// Read an experiment configuration; missing fields take their defaults.
pub fn load_experiment_config<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: ExperimentConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

/// Command line values that replace fields of the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub train: Option<PathBuf>,
    pub test: Option<PathBuf>,
    pub sample_submission: Option<PathBuf>,
    pub folds_dir: Option<PathBuf>,
    pub submissions_dir: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub no_report: bool,
}

fn path_value(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    matches
        .try_get_one::<PathBuf>(id)
        .ok()
        .flatten()
        .cloned()
}

impl ConfigOverrides {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        ConfigOverrides {
            train: path_value(matches, "train"),
            test: path_value(matches, "test"),
            sample_submission: path_value(matches, "sample_submission"),
            folds_dir: path_value(matches, "folds_dir"),
            submissions_dir: path_value(matches, "submissions_dir"),
            report: path_value(matches, "report"),
            no_report: matches.try_get_one::<bool>("no_report").ok().flatten().copied().unwrap_or(false),
        }
    }

    pub fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(train) = &self.train {
            config.train_file = train.clone();
        }
        if let Some(test) = &self.test {
            config.test_file = test.clone();
        }
        if let Some(sample) = &self.sample_submission {
            config.sample_submission_file = sample.clone();
        }
        if let Some(folds_dir) = &self.folds_dir {
            config.folds_dir = folds_dir.clone();
        }
        if let Some(submissions_dir) = &self.submissions_dir {
            config.submissions_dir = submissions_dir.clone();
        }
        if let Some(report) = &self.report {
            config.report_file = Some(report.clone());
        }
        if self.no_report {
            config.report_file = None;
        }
    }
}

/// Load the optional configuration file and apply the command line overrides.
pub fn resolve_config(matches: &ArgMatches) -> Result<ExperimentConfig> {
    let mut config = match path_value(matches, "config") {
        Some(path) => {
            log::info!("Using config: {}", path.display());
            load_experiment_config(&path)?
        }
        None => {
            log::info!("No config provided; using defaults.");
            ExperimentConfig::default()
        }
    };
    ConfigOverrides::from_matches(matches).apply(&mut config);

    if path_value(matches, "config").is_none() {
        let json = serde_json::to_string_pretty(&config).unwrap_or_default();
        log::info!("Effective config:\n{}", json);
    }
    Ok(config)
}

/// Check the input tables a subcommand reads before any work starts.
pub fn validate_inputs(config: &ExperimentConfig, needs_submission_inputs: bool) -> Result<()> {
    validate_tsv_or_csv_file(&config.train_file).context("Invalid training table")?;
    if needs_submission_inputs {
        validate_tsv_or_csv_file(&config.test_file).context("Invalid leaderboard table")?;
        validate_tsv_or_csv_file(&config.sample_submission_file)
            .context("Invalid sample submission")?;
    }
    Ok(())
}
