//! insults-classifiers: detecting insults in social commentary.
//!
//! Comments are featurized as TF-IDF weighted character n-grams, pruned by a
//! sparse L1 SGD regressor, and scored by an SGD regressor trained in steps so
//! that K-fold cross-validation can pick the number of training iterations
//! from a single fit per fold. The crate also reads the competition tables and
//! writes the per-fold, aggregate and submission artifacts plus an HTML report.
pub mod config;
pub mod cross_validation;
pub mod error;
pub mod experiment;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod sparse;
pub mod stats;
pub mod text;
