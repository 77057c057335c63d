use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to the experiment JSON configuration file")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn path_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .help(help)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::AnyPath)
}

/// Path overrides shared by every subcommand.
fn with_path_overrides(command: Command) -> Command {
    command
        .arg(config_arg())
        .arg(path_arg(
            "train",
            "train",
            "Training table (Comment, Insult). Overrides `train_file` in the configuration file.",
        ))
        .arg(path_arg(
            "test",
            "test",
            "Leaderboard comments to score. Overrides `test_file` in the configuration file.",
        ))
        .arg(path_arg(
            "sample_submission",
            "sample-submission",
            "Sample submission used as the output template. Overrides `sample_submission_file`.",
        ))
        .arg(path_arg(
            "folds_dir",
            "folds-dir",
            "Directory for per-fold AUC curves. Overrides `folds_dir`.",
        ))
        .arg(path_arg(
            "submissions_dir",
            "submissions-dir",
            "Directory for numbered submissions. Overrides `submissions_dir`.",
        ))
        .arg(path_arg(
            "report",
            "report",
            "Path of the HTML cross-validation report. Overrides `report_file`.",
        ))
        .arg(
            Arg::new("no_report")
                .long("no-report")
                .help("Disable HTML report generation.")
                .action(ArgAction::SetTrue)
                .conflicts_with("report"),
        )
}

pub fn build_cli() -> Command {
    Command::new("insults")
        .version(clap::crate_version!())
        .about("Staged character n-gram insult classifier: cross-validation and submissions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .global(true)
                .help("Write logs to this file instead of stderr.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(with_path_overrides(
            Command::new("run")
                .about("Cross-validate, pick the iteration count and write a submission"),
        ))
        .subcommand(with_path_overrides(
            Command::new("cv").about("Run K-fold cross-validation and write the fold artifacts"),
        ))
        .subcommand(with_path_overrides(
            Command::new("predict")
                .about("Train on all training comments and write a submission")
                .arg(
                    Arg::new("iterations")
                        .short('n')
                        .long("iterations")
                        .help(
                            "Number of SGD iterations for the final model. \
                             Defaults to `total_iterations` in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("folds")
                .about("Print the aggregate held-out AUC table from saved fold curves")
                .arg(config_arg())
                .arg(path_arg(
                    "folds_dir",
                    "folds-dir",
                    "Directory holding fold*.csv files. Overrides `folds_dir`.",
                )),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
