//! Text featurization: character n-gram counts and TF-IDF weighting.
pub mod tfidf;
pub mod vectorizer;

pub use tfidf::TfidfTransformer;
pub use vectorizer::{normalize_whitespace, CharNgramVectorizer};
