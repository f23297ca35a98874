use std::path::PathBuf;

use stocksense_core::{SourceError, Symbol};
use thiserror::Error;

/// Failures while fitting or applying a regressor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyDataset,
    #[error("feature row count {rows} does not match label count {labels}")]
    LabelCount { rows: usize, labels: usize },
    #[error("feature row has {actual} columns, model expects {expected}")]
    FeatureWidth { expected: usize, actual: usize },
    #[error("non-finite value in row {row}")]
    NonFinite { row: usize },
    #[error("invalid forest config: {0}")]
    InvalidConfig(String),
}

/// Failures reading or writing model artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode model: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("model for {symbol} has not been trained yet")]
    NotReady { symbol: Symbol },
    #[error("market data fetch failed: {0}")]
    Fetch(#[from] SourceError),
    #[error("no usable recent bar for {symbol}")]
    NoRecentData { symbol: Symbol },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
