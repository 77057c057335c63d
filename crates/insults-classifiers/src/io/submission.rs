//! Numbered submission files built from the sample-submission template.
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::Array1;

use super::comments::LABEL_COLUMN;
use super::find_column;

pub fn submission_file_name(n: usize) -> String {
    format!("submission{}.csv", n)
}

/// Create the first free `submission{N}.csv` (N = 1, 2, ...) in `dir`.
///
/// Files are opened with `create_new`, so an existing submission is never
/// overwritten even if another run claims the same number concurrently.
fn create_next_submission(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create submissions directory: {}", dir.display()))?;
    let mut n = 1;
    loop {
        let path = dir.join(submission_file_name(n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create submission: {}", path.display()))
            }
        }
    }
}

/// Write a claimed submission file, removing it again if `write` fails so
/// the number stays free.
fn fill_or_discard<F>(path: &Path, file: File, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Err(e) = write(file) {
        if let Err(remove_err) = fs::remove_file(path) {
            log::warn!(
                "Failed to remove incomplete submission {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(e).with_context(|| format!("Failed to write submission: {}", path.display()));
    }
    Ok(())
}

/// Copy `template`, replace its `Insult` column with `predictions` and write
/// it to the next numbered submission file in `dir`.
///
/// # Returns
///
/// The path of the file written.
pub fn write_submission<P: AsRef<Path>, D: AsRef<Path>>(
    template: P,
    predictions: &Array1<f64>,
    dir: D,
) -> Result<PathBuf> {
    let template = template.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(template)
        .with_context(|| format!("Failed to open sample submission: {}", template.display()))?;
    let headers = reader.headers()?.clone();
    let label_idx = find_column(&headers, LABEL_COLUMN).ok_or_else(|| {
        anyhow!("Missing '{}' column in {}", LABEL_COLUMN, template.display())
    })?;

    let rows: Vec<StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .with_context(|| format!("Failed to read sample submission: {}", template.display()))?;
    if rows.len() != predictions.len() {
        return Err(anyhow!(
            "Sample submission {} has {} rows but {} predictions were made",
            template.display(),
            rows.len(),
            predictions.len()
        ));
    }

    let (path, file) = create_next_submission(dir.as_ref())?;
    fill_or_discard(&path, file, |file| {
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&headers)?;
        for (row, prediction) in rows.iter().zip(predictions.iter()) {
            let record: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(idx, field)| {
                    if idx == label_idx {
                        prediction.to_string()
                    } else {
                        field.to_string()
                    }
                })
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    })?;

    log::info!("Saved submission with {} rows to {}", rows.len(), path.display());
    Ok(path)
}
