//! Song Genre Prediction Pipeline
//!
//! Builds the feature transformer and the classifier once from a single
//! configuration document and runs raw song batches through both.
//!
//! ```no_run
//! use genre_pipeline::{init_logging, GenrePipeline, PipelineConfig};
//!
//! # fn main() -> Result<(), genre_pipeline::PipelineError> {
//! let config = PipelineConfig::load("configs/genre-pipeline.yaml")?;
//! init_logging(&config.logging)?;
//! let pipeline = GenrePipeline::from_config(&config)?;
//! # let batch = feature_engine::RecordBatch::default();
//! let predictions = pipeline.classify(&batch)?;
//! # let _ = predictions;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod logging;
mod pipeline;

pub use config::{PipelineConfig, ServiceConfig};
pub use error::PipelineError;
pub use logging::{init_logging, LoggingConfig};
pub use pipeline::{GenrePipeline, GenrePrediction};
