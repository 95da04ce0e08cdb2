//! Feature Engineering Engine
//!
//! Turns raw song records into the numeric feature matrix consumed by the
//! genre classifier: column selection, categorical encoding, numerical
//! normalization and missing-value imputation, driven by configuration.

mod config;
mod encoder;
mod error;
mod fitted;
mod imputer;
mod matrix;
mod normalizer;
mod record;
mod statistics;
mod transformer;

pub use config::{
    AutoKeyword, BinaryConfig, CategoricalConfig, CategorySource, FeatureConfig, FeatureSpec,
    NumericalConfig, OneHotCategories,
};
pub use encoder::{CategoricalEncoder, UnknownCategoryPolicy, UNKNOWN_CODE};
pub use error::FeatureError;
pub use fitted::{FittedCategorical, FittedNumerical, FittedParams};
pub use imputer::ImputeStrategy;
pub use matrix::FeatureMatrix;
pub use normalizer::{NormalizationMethod, Scaler};
pub use record::{NotNumeric, Record, RecordBatch, Value};
pub use statistics::ColumnStatistics;
pub use transformer::FeatureTransformer;
