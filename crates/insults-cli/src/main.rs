use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;

use insults_classifiers::experiment::{run_cross_validation, run_experiment, run_submission};
use insults_classifiers::io::collect_fold_curves;
use insults_cli::cli::build_cli;
use insults_cli::config::{resolve_config, validate_inputs};
use insults_cli::logging::init_logging;

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_one::<PathBuf>("log_file").map(PathBuf::as_path))?;

    let outcome = match matches.subcommand() {
        Some(("run", sub_m)) => handle_run(sub_m),
        Some(("cv", sub_m)) => handle_cv(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("folds", sub_m)) => handle_folds(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = outcome {
        log::error!("insults failed: {:#}", e);
        std::process::exit(1)
    }
    Ok(())
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    validate_inputs(&config, true)?;
    log::info!("[insults::run] Training data: {}", config.train_file.display());

    let outcome = run_experiment(&config)?;
    log::info!(
        "[insults::run] Trained final model for {} iterations; submission saved to {}",
        outcome.total_iterations,
        outcome.submission.display()
    );
    Ok(())
}

fn handle_cv(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    validate_inputs(&config, false)?;
    log::info!("[insults::cv] Training data: {}", config.train_file.display());

    let summary = run_cross_validation(&config)?;
    println!("{}", summary.aggregate);
    match summary.selected_iterations() {
        Some(selected) => println!("selected iterations: {}", selected),
        None => println!("no iteration count selected"),
    }
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    validate_inputs(&config, true)?;
    let iterations = matches
        .get_one::<usize>("iterations")
        .copied()
        .unwrap_or(config.pipeline.regressor.total_iterations);
    log::info!("[insults::predict] Final model iterations: {}", iterations);

    let path = run_submission(&config, iterations)?;
    println!("{}", path.display());
    Ok(())
}

fn handle_folds(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let table = collect_fold_curves(&config.folds_dir)?;
    print!("{}", table);
    Ok(())
}
