//! Kaggle comment tables (`train.csv`, `test.csv`).
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ndarray::Array1;

use super::find_column;

pub const COMMENT_COLUMN: &str = "Comment";
pub const LABEL_COLUMN: &str = "Insult";

/// Comments in file order, with labels when the table has them.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentTable {
    pub comments: Vec<String>,
    pub labels: Option<Array1<f64>>,
}

impl CommentTable {
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Labels, or an error naming the table when it has none.
    pub fn require_labels(&self) -> Result<&Array1<f64>> {
        self.labels
            .as_ref()
            .ok_or_else(|| anyhow!("Comment table has no '{}' column", LABEL_COLUMN))
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> CommentTable {
        CommentTable {
            comments: indices.iter().map(|&i| self.comments[i].clone()).collect(),
            labels: self
                .labels
                .as_ref()
                .map(|labels| indices.iter().map(|&i| labels[i]).collect()),
        }
    }
}

/// Read a labelled training table; requires `Comment` and `Insult` columns.
pub fn read_training_table<P: AsRef<Path>>(path: P) -> Result<CommentTable> {
    read_table(path.as_ref(), true)
}

/// Read an unlabelled comment table; only `Comment` is required.
pub fn read_comment_table<P: AsRef<Path>>(path: P) -> Result<CommentTable> {
    read_table(path.as_ref(), false)
}

fn read_table(path: &Path, labelled: bool) -> Result<CommentTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open comment table: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .clone();

    let comment_idx = find_column(&headers, COMMENT_COLUMN).ok_or_else(|| {
        anyhow!("Missing '{}' column in {}", COMMENT_COLUMN, path.display())
    })?;
    let label_idx = if labelled {
        Some(find_column(&headers, LABEL_COLUMN).ok_or_else(|| {
            anyhow!("Missing '{}' column in {}", LABEL_COLUMN, path.display())
        })?)
    } else {
        None
    };

    let mut comments = Vec::new();
    let mut labels = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to read row {} of {}", row_idx + 1, path.display())
        })?;

        let comment = record
            .get(comment_idx)
            .ok_or_else(|| anyhow!("Missing comment at row {}", row_idx + 1))?;
        comments.push(comment.to_string());

        if let Some(label_idx) = label_idx {
            let raw = record
                .get(label_idx)
                .ok_or_else(|| anyhow!("Missing label at row {}", row_idx + 1))?;
            labels.push(parse_label(raw).with_context(|| {
                format!("Invalid label at row {} of {}", row_idx + 1, path.display())
            })?);
        }
    }

    log::info!("Read {} comments from {}", comments.len(), path.display());
    Ok(CommentTable {
        comments,
        labels: label_idx.map(|_| Array1::from(labels)),
    })
}

fn parse_label(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", raw))?;
    if value == 0.0 || value == 1.0 {
        Ok(value)
    } else {
        Err(anyhow!("label must be 0 or 1, got {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_accept_integers_and_floats() {
        assert_eq!(parse_label("1").unwrap(), 1.0);
        assert_eq!(parse_label(" 0.0 ").unwrap(), 0.0);
        assert!(parse_label("0.5").is_err());
        assert!(parse_label("yes").is_err());
    }

    #[test]
    fn select_keeps_requested_order() {
        let table = CommentTable {
            comments: vec!["a".into(), "b".into(), "c".into()],
            labels: Some(Array1::from(vec![0.0, 1.0, 0.0])),
        };
        let picked = table.select(&[2, 1]);
        assert_eq!(picked.comments, vec!["c", "b"]);
        assert_eq!(picked.labels.unwrap().to_vec(), vec![0.0, 1.0]);
    }
}
