//! Helpers for building and walking CSR feature matrices.
//!
//! All feature matrices in this crate are `sprs::CsMat<f64>` in CSR layout:
//! one row per document, one column per vocabulary entry.
use sprs::{CsMat, CsVecView};

/// Incrementally assembles a CSR matrix row by row.
#[derive(Debug, Clone)]
pub struct CsrBuilder {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrBuilder {
    pub fn new(n_cols: usize) -> Self {
        Self::with_capacity(n_cols, 0, 0)
    }

    pub fn with_capacity(n_cols: usize, n_rows: usize, nnz: usize) -> Self {
        let mut indptr = Vec::with_capacity(n_rows + 1);
        indptr.push(0);
        CsrBuilder {
            n_cols,
            indptr,
            indices: Vec::with_capacity(nnz),
            data: Vec::with_capacity(nnz),
        }
    }

    /// Append one row. Column indices must be unique and `< n_cols`;
    /// explicit zeros are dropped.
    pub fn push_row(&mut self, mut entries: Vec<(usize, f64)>) {
        entries.sort_unstable_by_key(|&(col, _)| col);
        for (col, value) in entries {
            debug_assert!(col < self.n_cols, "column {} out of bounds", col);
            if value != 0.0 {
                self.indices.push(col);
                self.data.push(value);
            }
        }
        self.indptr.push(self.indices.len());
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn build(self) -> CsMat<f64> {
        let n_rows = self.n_rows();
        CsMat::new((n_rows, self.n_cols), self.indptr, self.indices, self.data)
    }
}

/// Dot product of a sparse row with a dense weight slice.
#[inline]
pub fn row_dot(row: CsVecView<f64>, weights: &[f64]) -> f64 {
    row.iter().map(|(col, &value)| value * weights[col]).sum()
}

/// Number of rows with a non-zero entry in each column.
pub fn document_frequency(x: &CsMat<f64>) -> Vec<usize> {
    let mut df = vec![0usize; x.cols()];
    for row in x.outer_iterator() {
        for (col, &value) in row.iter() {
            if value != 0.0 {
                df[col] += 1;
            }
        }
    }
    df
}

/// Keep the columns listed in `keep` (ascending), renumbering them `0..keep.len()`.
pub fn select_columns(x: &CsMat<f64>, keep: &[usize]) -> CsMat<f64> {
    let mut remap = vec![None; x.cols()];
    for (new_col, &old_col) in keep.iter().enumerate() {
        remap[old_col] = Some(new_col);
    }

    let mut builder = CsrBuilder::with_capacity(keep.len(), x.rows(), x.nnz());
    for row in x.outer_iterator() {
        let entries = row
            .iter()
            .filter_map(|(col, &value)| remap[col].map(|new_col| (new_col, value)))
            .collect();
        builder.push_row(entries);
    }
    builder.build()
}
