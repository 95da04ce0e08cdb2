//! Transformer and classifier composed over raw record batches

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use feature_engine::{FeatureError, FeatureTransformer, RecordBatch, Value};
use inference_engine::Classifier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Predicted genre for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenrePrediction {
    /// Value of the configured id column
    pub id: Value,
    pub genre: String,
}

/// Ready-to-use pipeline, built once and shared across calls
#[derive(Debug)]
pub struct GenrePipeline {
    transformer: FeatureTransformer,
    classifier: Classifier,
    id_column: String,
}

impl GenrePipeline {
    pub fn new(
        transformer: FeatureTransformer,
        classifier: Classifier,
        id_column: impl Into<String>,
    ) -> Self {
        Self {
            transformer,
            classifier,
            id_column: id_column.into(),
        }
    }

    /// Build both components from an already loaded configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let transformer = FeatureTransformer::from_config(&config.features)?;
        let classifier = Classifier::load(&config.model)?;

        info!(
            "Genre pipeline ready: {} input columns, {} classifier, {} labels",
            transformer.spec().all_columns().len(),
            classifier.model_type(),
            classifier.labels().len()
        );
        Ok(Self::new(
            transformer,
            classifier,
            config.pipeline.id_column.clone(),
        ))
    }

    /// Load the configuration document at `path` and build the pipeline
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Self::from_config(&PipelineConfig::load(path)?)
    }

    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Genre label per record, in input order
    pub fn predict_genres(&self, batch: &RecordBatch) -> Result<Vec<String>, PipelineError> {
        let features = self.transformer.transform(batch)?;
        Ok(self.classifier.predict_labels(&features)?)
    }

    /// `(id, genre)` per record, in input order
    pub fn classify(&self, batch: &RecordBatch) -> Result<Vec<GenrePrediction>, PipelineError> {
        let ids = batch
            .records()
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record
                    .get(&self.id_column)
                    .cloned()
                    .ok_or_else(|| FeatureError::MissingColumn {
                        row,
                        column: self.id_column.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let genres = self.predict_genres(batch)?;
        debug!("Classified {} records", genres.len());

        Ok(ids
            .into_iter()
            .zip(genres)
            .map(|(id, genre)| GenrePrediction { id, genre })
            .collect())
    }
}
