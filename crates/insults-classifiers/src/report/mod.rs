pub mod html;
pub mod plots;

pub use html::{write_cv_report, Report, ReportSection};
pub use plots::{plot_fold_best, plot_staged_auc};
