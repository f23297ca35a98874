use std::path::PathBuf;

use stocksense_core::Period;

use crate::forest::ForestConfig;

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_BREAKOUT_WINDOW: usize = 20;
pub const FORECAST_HORIZON: usize = 3;

/// Predictor settings; defaults reproduce the dashboard's fixed windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorConfig {
    pub model_dir: PathBuf,
    pub train_period: Period,
    pub predict_period: Period,
    pub forecast_period: Period,
    pub breakout_period: Period,
    /// Sessions scanned for the breakout threshold.
    pub breakout_window: usize,
    pub forest: ForestConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            train_period: Period::OneYear,
            predict_period: Period::SevenDays,
            forecast_period: Period::TenDays,
            breakout_period: Period::OneMonth,
            breakout_window: DEFAULT_BREAKOUT_WINDOW,
            forest: ForestConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }
}
