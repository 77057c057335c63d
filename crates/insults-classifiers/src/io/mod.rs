//! CSV input tables and experiment artifacts.
pub mod comments;
pub mod folds;
pub mod submission;

use csv::StringRecord;

pub use comments::{read_comment_table, read_training_table, CommentTable};
pub use folds::{
    collect_fold_curves, read_fold_curve, read_fold_curves, write_aggregate, write_fold_curve,
    AGGREGATE_FILE,
};
pub use submission::write_submission;

/// Case-insensitive header lookup.
pub(crate) fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}
