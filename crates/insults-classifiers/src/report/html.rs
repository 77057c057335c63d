//! Self-contained HTML report of a cross-validation run.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use super::plots::{plot_fold_best, plot_staged_auc};
use crate::config::ExperimentConfig;
use crate::cross_validation::CrossValidationSummary;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A titled block of report content.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let id = format!(
            "plot-{}-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.content.len()
        );
        self.content.push(PreEscaped(plot.to_inline_html(Some(id.as_str()))));
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div class="block" { (block) }
                }
            }
        }
    }
}

pub struct Report {
    title: String,
    version: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, version: &str) -> Self {
        Report {
            title: title.to_string(),
            version: version.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                        table { border-collapse: collapse; }
                        td, th { border: 1px solid #ccc; padding: 4px 8px; text-align: right; }
                        .code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; font-family: monospace; white-space: pre-wrap; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p { "insults " (self.version) " | generated " (generated) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, self.render().into_string())
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

/// Write the cross-validation report for `summary` to `path`.
pub fn write_cv_report<P: AsRef<Path>>(
    path: P,
    summary: &CrossValidationSummary,
    config: &ExperimentConfig,
) -> Result<()> {
    let mut report = Report::new("Insult Classifier Cross-Validation", env!("CARGO_PKG_VERSION"));

    /* Section 1: Overview */
    {
        let mut overview = ReportSection::new("Overview");
        overview.add_content(html! {
            p { "Folds: " (summary.folds.len()) }
            @if let Some(choice) = &summary.stopping {
                p { "Selected iterations: " (choice.selected) }
                p { "Held-out AUC at selected iterations: "
                    (format!("{:.4} ± {:.4}", choice.mean_auc, choice.std_auc)) }
            } @else {
                p { "No iteration count could be selected." }
            }
            table {
                tr { th { "fold" } th { "train" } th { "test" } th { "training auc" } th { "best held-out auc" } }
                @for fold in &summary.folds {
                    tr {
                        td { (fold.fold) }
                        td { (fold.n_train) }
                        td { (fold.n_test) }
                        td { (format!("{:.4}", fold.train_auc)) }
                        td { (format_cell(fold.curve.best().map(|(_, auc)| auc))) }
                    }
                }
            }
        });
        overview.add_plot(plot_staged_auc(&summary.curves));
        if let Some(choice) = &summary.stopping {
            overview.add_plot(plot_fold_best(choice));
        }
        report.add_section(overview);
    }

    /* Section 2: Aggregate table */
    {
        let table = &summary.aggregate;
        let mut aggregate = ReportSection::new("Held-out AUC by Iterations");
        aggregate.add_content(html! {
            table {
                tr {
                    th { "iterations" }
                    @for (name, _) in &table.columns { th { (name) } }
                }
                @for (row, iterations) in table.iterations.iter().enumerate() {
                    tr {
                        td { (iterations) }
                        @for (_, values) in &table.columns { td { (format_cell(values[row])) } }
                    }
                }
            }
        });
        report.add_section(aggregate);
    }

    /* Section 3: Configuration */
    {
        let config_json = serde_json::to_string_pretty(config)?;
        let mut config_section = ReportSection::new("Configuration");
        config_section.add_content(html! {
            div class="code-container" {
                pre {
                    code { (config_json) }
                }
            }
        });
        report.add_section(config_section);
    }

    report.save_to_file(&path)?;
    log::info!("Saved cross-validation report to {}", path.as_ref().display());
    Ok(())
}
