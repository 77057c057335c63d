//! Text-to-score pipeline: vectorizer, sparse transforms, final regressor.
use anyhow::{Context, Result};
use ndarray::Array1;
use sprs::CsMat;

use crate::config::PipelineConfig;
use crate::models::{Regressor, SparseTransform, SparsityFilter, StagedModel, StagedRegressor};
use crate::text::{CharNgramVectorizer, TfidfTransformer};

pub struct Pipeline<M: Regressor> {
    vectorizer: CharNgramVectorizer,
    transforms: Vec<Box<dyn SparseTransform + Send + Sync>>,
    model: M,
}

impl Pipeline<StagedRegressor> {
    /// Character n-grams -> TF-IDF -> sparsity filter -> staged SGD.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let vectorizer = CharNgramVectorizer::new(config.vectorizer.clone())
            .context("Invalid vectorizer configuration")?;
        let filter =
            SparsityFilter::new(config.filter.clone()).context("Invalid filter configuration")?;
        let model = StagedRegressor::new(config.regressor.clone())
            .context("Invalid staged regressor configuration")?;

        let transforms: Vec<Box<dyn SparseTransform + Send + Sync>> = vec![
            Box::new(TfidfTransformer::new(config.tfidf.clone())),
            Box::new(filter),
        ];
        Ok(Pipeline::new(vectorizer, transforms, model))
    }
}

impl<M: Regressor> Pipeline<M> {
    pub fn new(
        vectorizer: CharNgramVectorizer,
        transforms: Vec<Box<dyn SparseTransform + Send + Sync>>,
        model: M,
    ) -> Self {
        Pipeline {
            vectorizer,
            transforms,
            model,
        }
    }

    pub fn vectorizer(&self) -> &CharNgramVectorizer {
        &self.vectorizer
    }

    pub fn final_model(&self) -> &M {
        &self.model
    }

    pub fn final_model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Fit every stage in order, each on the output of the previous one.
    pub fn fit<S: AsRef<str> + Sync>(&mut self, texts: &[S], y: &Array1<f64>) -> Result<()> {
        let mut x = self
            .vectorizer
            .fit_transform(texts)
            .context("feature extraction")?;
        log::debug!("Feature matrix: {} x {} ({} nnz)", x.rows(), x.cols(), x.nnz());

        for transform in self.transforms.iter_mut() {
            x = transform
                .fit_transform(&x, y)
                .with_context(|| format!("{} fit", transform.name()))?;
            log::debug!("After {}: {} features", transform.name(), x.cols());
        }

        self.model
            .fit(&x, y)
            .with_context(|| format!("{} fit", self.model.name()))?;
        Ok(())
    }

    /// Feature matrix seen by the final model; fitted stages are not refit.
    pub fn transform<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<CsMat<f64>> {
        let mut x = self
            .vectorizer
            .transform(texts)
            .context("feature extraction")?;
        for transform in &self.transforms {
            x = transform
                .transform(&x)
                .with_context(|| format!("{} transform", transform.name()))?;
        }
        Ok(x)
    }

    pub fn predict<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Array1<f64>> {
        let x = self.transform(texts)?;
        self.model
            .predict(&x)
            .with_context(|| format!("{} predict", self.model.name()))
    }
}

impl<M: StagedModel> Pipeline<M> {
    /// Held-out AUC of every stage of the final model.
    pub fn staged_auc<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        y: &Array1<f64>,
    ) -> Result<(Vec<usize>, Vec<f64>)> {
        let x = self.transform(texts)?;
        self.model
            .staged_auc(&x, y)
            .with_context(|| format!("{} staged auc", self.model.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, LearningRate, Penalty, SgdConfig, StagedConfig};

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            filter: FilterConfig {
                sgd: SgdConfig {
                    n_iter: 30,
                    learning_rate: LearningRate::Constant { eta0: 0.05 },
                    ..SgdConfig::default()
                },
                threshold: None,
            },
            regressor: StagedConfig {
                step_size: 5,
                total_iterations: 20,
                eta0: 0.05,
                alpha: 1e-6,
                penalty: Penalty::L2,
                ..StagedConfig::default()
            },
            ..PipelineConfig::default()
        }
    }

    fn corpus() -> (Vec<String>, Array1<f64>) {
        let texts = vec![
            "you idiot".to_string(),
            "nice weather today".to_string(),
            "what an idiot".to_string(),
            "thanks for sharing".to_string(),
        ];
        (texts, Array1::from(vec![1.0, 0.0, 1.0, 0.0]))
    }

    #[test]
    fn fit_then_predict_scores_every_text() {
        let (texts, y) = corpus();
        let mut pipeline = Pipeline::from_config(&small_config()).unwrap();
        pipeline.fit(&texts, &y).unwrap();
        let pred = pipeline.predict(&["idiot", "weather", "hello there"]).unwrap();
        assert_eq!(pred.len(), 3);
        assert!(pred.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert_eq!(pipeline.final_model().n_stages(), 4);
    }

    #[test]
    fn staged_auc_reuses_fitted_transforms() {
        let (texts, y) = corpus();
        let mut pipeline = Pipeline::from_config(&small_config()).unwrap();
        pipeline.fit(&texts, &y).unwrap();
        let width = pipeline.transform(&texts).unwrap().cols();
        let (iterations, aucs) = pipeline.staged_auc(&texts, &y).unwrap();
        assert_eq!(iterations, vec![5, 10, 15, 20]);
        assert_eq!(aucs.len(), 4);
        assert_eq!(pipeline.transform(&texts).unwrap().cols(), width);
    }

    #[test]
    fn errors_name_the_failing_stage() {
        let (texts, _) = corpus();
        let pipeline = Pipeline::from_config(&small_config()).unwrap();
        let err = pipeline.predict(&texts).unwrap_err();
        assert!(format!("{:#}", err).contains("feature extraction"));

        let mut pipeline = Pipeline::from_config(&small_config()).unwrap();
        let short = Array1::from(vec![1.0]);
        let err = pipeline.fit(&texts, &short).unwrap_err();
        assert!(format!("{:#}", err).contains("filter fit"));
    }
}
