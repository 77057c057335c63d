//! Per-fold AUC curves and their aggregate, as CSV artifacts.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use super::find_column;
use crate::cross_validation::{AggregateTable, PerformanceCurve};

pub const ITERATIONS_COLUMN: &str = "iterations";
pub const AGGREGATE_FILE: &str = "aggregate.csv";

pub fn fold_file_name(fold: usize) -> String {
    format!("fold{}.csv", fold)
}

pub fn auc_column_name(fold: usize) -> String {
    format!("auc{}", fold)
}

/// Fold index encoded in a `fold{i}.csv` file name.
fn parse_fold_file_name(name: &str) -> Option<usize> {
    name.strip_prefix("fold")?.strip_suffix(".csv")?.parse().ok()
}

/// Write `fold{i}.csv` with columns `iterations,auc{i}` into `dir`.
pub fn write_fold_curve<P: AsRef<Path>>(dir: P, curve: &PerformanceCurve) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create folds directory: {}", dir.display()))?;
    let path = dir.join(fold_file_name(curve.fold));

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create fold file: {}", path.display()))?;
    writer.write_record([ITERATIONS_COLUMN.to_string(), auc_column_name(curve.fold)])?;
    for (iterations, auc) in curve.iterations.iter().zip(&curve.auc) {
        writer.write_record([iterations.to_string(), auc.to_string()])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write fold file: {}", path.display()))?;

    log::info!("Saved AUC curve for fold {} to {}", curve.fold, path.display());
    Ok(path)
}

/// Read a curve written by [`write_fold_curve`].
pub fn read_fold_curve<P: AsRef<Path>>(path: P) -> Result<PerformanceCurve> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open fold file: {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let iter_idx = find_column(&headers, ITERATIONS_COLUMN).ok_or_else(|| {
        anyhow!("Missing '{}' column in {}", ITERATIONS_COLUMN, path.display())
    })?;
    let (auc_idx, auc_name) = headers
        .iter()
        .enumerate()
        .find(|(_, h)| h.to_ascii_lowercase().starts_with("auc"))
        .map(|(idx, h)| (idx, h.to_string()))
        .ok_or_else(|| anyhow!("Missing auc column in {}", path.display()))?;

    let fold = auc_name[3..]
        .parse::<usize>()
        .ok()
        .or_else(|| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_fold_file_name)
        })
        .ok_or_else(|| anyhow!("Cannot determine fold index of {}", path.display()))?;

    let mut iterations = Vec::new();
    let mut auc = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        let iters = record
            .get(iter_idx)
            .ok_or_else(|| anyhow!("Missing iterations at row {}", row_idx + 1))?
            .trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid iterations at row {}", row_idx + 1))?;
        let value = record
            .get(auc_idx)
            .ok_or_else(|| anyhow!("Missing auc at row {}", row_idx + 1))?
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid auc at row {}", row_idx + 1))?;
        iterations.push(iters);
        auc.push(value);
    }

    Ok(PerformanceCurve {
        fold,
        iterations,
        auc,
    })
}

/// Every `fold*.csv` curve in `dir`, ordered by fold index.
pub fn read_fold_curves<P: AsRef<Path>>(dir: P) -> Result<Vec<PerformanceCurve>> {
    let dir = dir.as_ref();
    let mut paths: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to list folds directory: {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(fold) = name.to_str().and_then(parse_fold_file_name) {
            paths.push((fold, entry.path()));
        }
    }
    paths.sort_by_key(|(fold, _)| *fold);

    paths.iter().map(|(_, path)| read_fold_curve(path)).collect()
}

/// Outer join of every fold curve in `dir` on the iteration count.
pub fn collect_fold_curves<P: AsRef<Path>>(dir: P) -> Result<AggregateTable> {
    let curves = read_fold_curves(dir)?;
    Ok(AggregateTable::from_curves(&curves))
}

/// Write the aggregate table; missing cells are left empty.
pub fn write_aggregate<P: AsRef<Path>>(path: P, table: &AggregateTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create aggregate file: {}", path.display()))?;

    let mut header = vec![ITERATIONS_COLUMN.to_string()];
    header.extend(table.columns.iter().map(|(name, _)| name.clone()));
    writer.write_record(&header)?;

    for (row, iterations) in table.iterations.iter().enumerate() {
        let mut record = vec![iterations.to_string()];
        record.extend(
            table
                .columns
                .iter()
                .map(|(_, values)| values[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write aggregate file: {}", path.display()))?;
    log::info!("Saved aggregate AUC table to {}", path.display());
    Ok(())
}
