use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

pub const LOG_ENV: &str = "INSULTS_LOG";
pub const DEFAULT_FILTER: &str = "error,insults=info";

/// Install the global logger; writes to `log_file` instead of stderr when given.
///
/// The filter defaults to [`DEFAULT_FILTER`] and can be replaced through the
/// `INSULTS_LOG` environment variable.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::default();
    builder
        .filter_level(LevelFilter::Error)
        .parse_env(Env::default().filter_or(LOG_ENV, DEFAULT_FILTER));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .context("Failed to initialise logging")?;
    Ok(())
}
