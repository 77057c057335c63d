//! Character n-gram count vectorizer.
//!
//! Character n-grams are robust to misspellings and to the creative
//! tokenization found in forum comments, so no word tokenizer is involved.
use std::collections::HashMap;

use rayon::prelude::*;
use sprs::CsMat;

use crate::config::VectorizerConfig;
use crate::error::ModelError;
use crate::sparse::CsrBuilder;

/// Collapse every run of two or more whitespace characters into one space.
///
/// A single whitespace character (including a lone newline) is kept as is.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;
    let mut run = 0usize;

    for ch in text.chars() {
        if ch.is_whitespace() {
            run += 1;
            pending = Some(ch);
            continue;
        }
        match run {
            0 => {}
            1 => out.push(pending.unwrap_or(' ')),
            _ => out.push(' '),
        }
        run = 0;
        out.push(ch);
    }
    match run {
        0 => {}
        1 => out.push(pending.unwrap_or(' ')),
        _ => out.push(' '),
    }
    out
}

/// Turns raw comments into sparse matrices of character n-gram counts.
#[derive(Debug, Clone)]
pub struct CharNgramVectorizer {
    config: VectorizerConfig,
    vocabulary: HashMap<String, usize>,
    feature_names: Vec<String>,
}

impl CharNgramVectorizer {
    pub fn new(config: VectorizerConfig) -> Result<Self, ModelError> {
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::InvalidParameter(format!(
                "ngram_range must satisfy 1 <= min_n <= max_n, got ({}, {})",
                min_n, max_n
            )));
        }
        if !(config.max_df > 0.0 && config.max_df <= 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "max_df must be in (0, 1], got {}",
                config.max_df
            )));
        }
        Ok(CharNgramVectorizer {
            config,
            vocabulary: HashMap::new(),
            feature_names: Vec::new(),
        })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.feature_names.is_empty()
    }

    /// Fitted n-grams, indexed by column.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.feature_names.len()
    }

    /// All character n-grams of one document, in order of appearance.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = normalize_whitespace(text);
        let text = if self.config.lowercase {
            text.to_lowercase()
        } else {
            text
        };
        let chars: Vec<char> = text.chars().collect();
        let (min_n, max_n) = self.config.ngram_range;

        let mut ngrams = Vec::new();
        for n in min_n..=max_n.min(chars.len()) {
            for window in chars.windows(n) {
                ngrams.push(window.iter().collect());
            }
        }
        ngrams
    }

    fn count_ngrams(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for ngram in self.analyze(text) {
            *counts.entry(ngram).or_insert(0) += 1;
        }
        counts
    }

    /// Learn the vocabulary from `documents`.
    pub fn fit<S: AsRef<str> + Sync>(&mut self, documents: &[S]) -> Result<(), ModelError> {
        let counts = self.count_all(documents)?;
        self.build_vocabulary(&counts)
    }

    /// Learn the vocabulary and return the count matrix of `documents`.
    pub fn fit_transform<S: AsRef<str> + Sync>(
        &mut self,
        documents: &[S],
    ) -> Result<CsMat<f64>, ModelError> {
        let counts = self.count_all(documents)?;
        self.build_vocabulary(&counts)?;
        Ok(self.counts_to_matrix(&counts))
    }

    /// Count matrix against the fitted vocabulary; unseen n-grams are ignored.
    pub fn transform<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Result<CsMat<f64>, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted("character n-gram vectorizer"));
        }
        let counts: Vec<HashMap<String, usize>> = documents
            .par_iter()
            .map(|doc| self.count_ngrams(doc.as_ref()))
            .collect();
        Ok(self.counts_to_matrix(&counts))
    }

    fn count_all<S: AsRef<str> + Sync>(
        &self,
        documents: &[S],
    ) -> Result<Vec<HashMap<String, usize>>, ModelError> {
        if documents.is_empty() {
            return Err(ModelError::EmptyInput("document collection"));
        }
        Ok(documents
            .par_iter()
            .map(|doc| self.count_ngrams(doc.as_ref()))
            .collect())
    }

    fn build_vocabulary(&mut self, counts: &[HashMap<String, usize>]) -> Result<(), ModelError> {
        let n_docs = counts.len();
        let mut doc_freq: HashMap<&str, (usize, usize)> = HashMap::new();
        for doc in counts {
            for (ngram, &count) in doc {
                let entry = doc_freq.entry(ngram.as_str()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        let max_doc_count = self.config.max_df * n_docs as f64;
        let mut kept: Vec<(&str, usize)> = doc_freq
            .into_iter()
            .filter(|&(_, (df, _))| df >= self.config.min_df && df as f64 <= max_doc_count)
            .map(|(ngram, (_, total))| (ngram, total))
            .collect();

        if let Some(max_features) = self.config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            kept.truncate(max_features);
        }

        if kept.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        let mut names: Vec<String> = kept.into_iter().map(|(ngram, _)| ngram.to_string()).collect();
        names.sort_unstable();

        self.vocabulary = names
            .iter()
            .enumerate()
            .map(|(idx, ngram)| (ngram.clone(), idx))
            .collect();
        self.feature_names = names;

        log::debug!(
            "Fitted character n-gram vocabulary: {} features from {} documents",
            self.feature_names.len(),
            n_docs
        );
        Ok(())
    }

    fn counts_to_matrix(&self, counts: &[HashMap<String, usize>]) -> CsMat<f64> {
        let mut builder = CsrBuilder::with_capacity(self.feature_names.len(), counts.len(), 0);
        for doc in counts {
            let entries = doc
                .iter()
                .filter_map(|(ngram, &count)| {
                    self.vocabulary.get(ngram).map(|&col| (col, count as f64))
                })
                .collect();
            builder.push_row(entries);
        }
        builder.build()
    }
}
