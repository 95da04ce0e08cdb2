//! Pipeline configuration document

use crate::error::PipelineError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use feature_engine::FeatureConfig;
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Prefix of environment variables overriding file values,
/// e.g. `GENRE_PIPELINE__MODEL__PATH`
pub const ENV_PREFIX: &str = "GENRE_PIPELINE";

/// Top-level configuration: model, features, pipeline options and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub pipeline: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `pipeline` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Record field copied into each prediction
    #[serde(default = "default_id_column")]
    pub id_column: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
        }
    }
}

fn default_id_column() -> String {
    "trackID".to_string()
}

impl PipelineConfig {
    /// Load a YAML, TOML or JSON document, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        info!(
            "Loaded pipeline configuration from {}: model {} at {}",
            path.display(),
            config.model.model_type,
            config.model.path.display()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use feature_engine::{ImputeStrategy, NormalizationMethod, OneHotCategories};

    fn parse(yaml: &str) -> Result<PipelineConfig, config::ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_full_document() {
        let config = parse(
            r#"
model:
  path: models/forest.json
  type: random forest classifier
  labels: [rock, pop]
features:
  binary: { columns: [explicit] }
  categorical: { columns: [mode], one_hot_encode: true, one_hot_categories: auto }
  numerical:
    columns: [tempo, loudness]
    normalization: min-max
    impute_missing: median
    fill_value: 0
pipeline:
  id_column: songId
logging:
  level: debug
  json: true
"#,
        )
        .unwrap();

        assert_eq!(config.model.model_type, "random forest classifier");
        assert_eq!(config.model.labels, vec!["rock", "pop"]);
        assert_eq!(config.features.binary.columns, vec!["explicit"]);
        assert!(config.features.categorical.one_hot_encode);
        assert!(matches!(
            config.features.categorical.one_hot_categories,
            OneHotCategories::Auto(_)
        ));
        assert_eq!(config.features.numerical.normalization, NormalizationMethod::MinMax);
        assert_eq!(config.features.numerical.impute_missing, ImputeStrategy::Median);
        assert_eq!(config.pipeline.id_column, "songId");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_defaults() {
        let config = parse(
            r#"
model:
  path: models/svc.json
  type: linear_svc
  labels: [rock, pop]
"#,
        )
        .unwrap();

        assert_eq!(config.pipeline.id_column, "trackID");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.features.numerical.columns.is_empty());
        assert_eq!(config.features.numerical.normalization, NormalizationMethod::None);
    }

    #[test]
    fn test_missing_model_section() {
        assert!(parse("logging: { level: info }").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            PipelineConfig::load("/nonexistent/genre-pipeline.yaml"),
            Err(PipelineError::Config(_))
        ));
    }
}
