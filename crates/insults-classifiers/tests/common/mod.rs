#![allow(dead_code)]

use std::fs;
use std::path::Path;

use insults_classifiers::config::{
    FilterConfig, LearningRate, Penalty, PipelineConfig, SgdConfig, StagedConfig,
};
use insults_classifiers::io::CommentTable;
use ndarray::Array1;

pub const INSULTS: [&str; 10] = [
    "you are an idiot",
    "what an idiot",
    "idiot!",
    "shut up idiot",
    "such an idiot move",
    "idiot idiot",
    "only an idiot would say that",
    "go away idiot",
    "total idiot",
    "classic idiot",
];

pub const CIVIL: [&str; 10] = [
    "thanks for the link",
    "great game last night",
    "I agree with this point",
    "nice photo of the lake",
    "see you at the meeting",
    "the weather is lovely",
    "good luck with the exam",
    "happy birthday to you",
    "well written article",
    "love this song",
];

/// 20 comments alternating insult / civil, starting with an insult.
pub fn idiot_corpus() -> CommentTable {
    let mut comments = Vec::new();
    let mut labels = Vec::new();
    for (insult, civil) in INSULTS.iter().zip(CIVIL.iter()) {
        comments.push(insult.to_string());
        labels.push(1.0);
        comments.push(civil.to_string());
        labels.push(0.0);
    }
    CommentTable {
        comments,
        labels: Some(Array1::from(labels)),
    }
}

pub fn small_pipeline() -> PipelineConfig {
    PipelineConfig {
        filter: FilterConfig {
            sgd: SgdConfig {
                n_iter: 50,
                ..SgdConfig::default()
            },
            threshold: None,
        },
        regressor: StagedConfig {
            step_size: 5,
            total_iterations: 50,
            alpha: 1e-6,
            penalty: Penalty::L2,
            eta0: 0.05,
            ..StagedConfig::default()
        },
        ..PipelineConfig::default()
    }
}

pub fn constant_rate(eta0: f64) -> LearningRate {
    LearningRate::Constant { eta0 }
}

/// Write a Kaggle-style training table.
pub fn write_train_csv(path: &Path, table: &CommentTable) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(["Insult", "Date", "Comment"]).unwrap();
    let labels = table.labels.as_ref().unwrap();
    for (comment, label) in table.comments.iter().zip(labels.iter()) {
        writer
            .write_record([format!("{}", *label as i32), "20120618192155Z".to_string(), comment.clone()])
            .unwrap();
    }
    writer.flush().unwrap();
}

/// Write a leaderboard table and a matching sample submission.
pub fn write_test_csvs(test: &Path, sample: &Path, comments: &[&str]) {
    let mut writer = csv::Writer::from_path(test).unwrap();
    writer.write_record(["id", "Date", "Comment"]).unwrap();
    for (i, comment) in comments.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), String::new(), comment.to_string()]).unwrap();
    }
    writer.flush().unwrap();

    let mut writer = csv::Writer::from_path(sample).unwrap();
    writer.write_record(["id", "Insult", "Date", "Comment"]).unwrap();
    for (i, comment) in comments.iter().enumerate() {
        writer
            .write_record([(i + 1).to_string(), "0".to_string(), String::new(), comment.to_string()])
            .unwrap();
    }
    writer.flush().unwrap();
}

pub fn read_to_string(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
