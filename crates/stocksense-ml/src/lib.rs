//! # StockSense ML
//!
//! Next-close prediction for StockSense.
//!
//! ## Pipeline
//!
//! ```text
//! MarketData ──▶ BarSeries + LiveQuote ──▶ Dataset ──▶ RandomForestRegressor ──▶ ModelStore
//!                                                            │
//!                                            FeatureRow ─────┴──▶ predicted close
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`PredictorConfig`] defaults |
//! | [`dataset`] | Feature/label pairs and RMSE |
//! | [`error`] | Model, store and predictor errors |
//! | [`features`] | [`FEATURE_COLUMNS`] and row construction |
//! | [`forest`] | Random forest regressor |
//! | [`insights`] | Forecast range, breakout level and placeholder commentary |
//! | [`predictor`] | Train/predict state machine per symbol |
//! | [`retrain`] | Bounded background retraining |
//! | [`store`] | Model artifacts on disk |

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod forest;
pub mod insights;
pub mod predictor;
pub mod retrain;
pub mod store;

pub use config::PredictorConfig;
pub use dataset::Dataset;
pub use error::{ModelError, PredictorError, StoreError};
pub use features::{FeatureRow, FEATURE_COLUMNS};
pub use forest::{ForestConfig, RandomForestRegressor};
pub use insights::{Direction, EventItem, Forecast, Insights, NewsItem};
pub use predictor::{ForestFitter, ModelFitter, ModelState, Predictor, TrainOutcome};
pub use retrain::{RetrainPool, RetrainStatus, DEFAULT_RETRAIN_WORKERS};
pub use store::ModelStore;
