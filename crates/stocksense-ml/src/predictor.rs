//! Per-symbol next-close predictor.
//!
//! A symbol is `Untrained` until a model is either loaded from the store or
//! fitted from a year of daily bars. Loaded artifacts are reused as-is on
//! later `train` calls; only [`Predictor::retrain`] refits a symbol that
//! already has one. A trained symbol never returns to `Untrained`: a refit
//! that finds too little data or fails keeps the previous model.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use stocksense_core::{LiveQuote, MarketData, Symbol};

use crate::config::{PredictorConfig, FORECAST_HORIZON};
use crate::dataset::Dataset;
use crate::error::{ModelError, PredictorError};
use crate::features::{bar_only_rows, FeatureRow, FEATURE_COLUMNS};
use crate::forest::{ForestConfig, RandomForestRegressor};
use crate::insights::{breakout_threshold, Forecast, Insights};
use crate::store::ModelStore;

/// Fitting seam so callers can substitute or observe the regressor.
pub trait ModelFitter: Send + Sync {
    fn fit(
        &self,
        dataset: &Dataset,
        config: &ForestConfig,
    ) -> Result<RandomForestRegressor, ModelError>;
}

/// Default fitter: a [`RandomForestRegressor`] over [`FEATURE_COLUMNS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ForestFitter;

impl ModelFitter for ForestFitter {
    fn fit(
        &self,
        dataset: &Dataset,
        config: &ForestConfig,
    ) -> Result<RandomForestRegressor, ModelError> {
        RandomForestRegressor::fit(config, &dataset.features, &dataset.labels, &FEATURE_COLUMNS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Untrained,
    Trained,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrainOutcome {
    /// Existing artifact reused without refitting.
    Loaded,
    Fitted {
        samples: usize,
        training_rmse: Option<f64>,
    },
    InsufficientData {
        bars: usize,
    },
    FitFailed {
        reason: String,
    },
}

impl TrainOutcome {
    pub const fn is_trained(&self) -> bool {
        matches!(self, Self::Loaded | Self::Fitted { .. })
    }
}

pub struct Predictor {
    market: MarketData,
    store: ModelStore,
    config: PredictorConfig,
    fitter: Arc<dyn ModelFitter>,
    models: RwLock<HashMap<Symbol, Arc<RandomForestRegressor>>>,
}

impl Predictor {
    pub fn new(market: MarketData, config: PredictorConfig) -> Self {
        Self {
            market,
            store: ModelStore::new(config.model_dir.clone()),
            config,
            fitter: Arc::new(ForestFitter),
            models: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_fitter(mut self, fitter: Arc<dyn ModelFitter>) -> Self {
        self.fitter = fitter;
        self
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn market(&self) -> &MarketData {
        &self.market
    }

    pub fn state(&self, symbol: &Symbol) -> ModelState {
        if self.read_models().contains_key(symbol) {
            ModelState::Trained
        } else {
            ModelState::Untrained
        }
    }

    /// Load the stored artifact if there is one, otherwise fit and persist.
    pub async fn train(&self, symbol: &Symbol) -> Result<TrainOutcome, PredictorError> {
        tracing::info!(%symbol, "training model");

        if let Some(model) = self.store.load(symbol)? {
            let path = self.store.path_for(symbol);
            tracing::info!(%symbol, path = %path.display(), "loaded stored model");
            self.install(symbol, Arc::new(model));
            return Ok(TrainOutcome::Loaded);
        }

        self.fit_and_persist(symbol).await
    }

    /// Always refit from fresh data and overwrite the artifact.
    pub async fn retrain(&self, symbol: &Symbol) -> Result<TrainOutcome, PredictorError> {
        tracing::info!(%symbol, "retraining model");
        self.fit_and_persist(symbol).await
    }

    async fn fit_and_persist(&self, symbol: &Symbol) -> Result<TrainOutcome, PredictorError> {
        let history = self
            .market
            .fetch_history(symbol, self.config.train_period)
            .await?;
        if history.len() < 2 {
            tracing::warn!(%symbol, bars = history.len(), "insufficient data for training");
            return Ok(TrainOutcome::InsufficientData {
                bars: history.len(),
            });
        }

        let quote = self.market.fetch_live_quote(symbol).await;
        log_quote_fallback(symbol, &quote);

        let dataset = Dataset::from_bars(&history.bars, &quote);
        tracing::debug!(
            %symbol,
            samples = dataset.n_samples(),
            features = ?FEATURE_COLUMNS,
            "built training set"
        );

        let fitter = Arc::clone(&self.fitter);
        let forest_config = self.config.forest.clone();
        let fitted = tokio::task::spawn_blocking(move || {
            let result = fitter.fit(&dataset, &forest_config);
            (dataset, result)
        })
        .await;

        let (dataset, model) = match fitted {
            Ok((dataset, Ok(model))) => (dataset, model),
            Ok((_, Err(error))) => return Ok(fit_failed(symbol, error.to_string())),
            Err(join_error) => return Ok(fit_failed(symbol, join_error.to_string())),
        };

        let training_rmse = model
            .predict(&dataset.features)
            .ok()
            .and_then(|predictions| dataset.rmse(&predictions));
        tracing::info!(
            %symbol,
            samples = dataset.n_samples(),
            trees = model.n_trees(),
            training_rmse = ?training_rmse,
            "model fitted"
        );

        let model = Arc::new(model);
        self.install(symbol, Arc::clone(&model));
        let path = self.store.save(symbol, &model)?;
        tracing::info!(%symbol, path = %path.display(), "model persisted");

        Ok(TrainOutcome::Fitted {
            samples: dataset.n_samples(),
            training_rmse,
        })
    }

    /// Predicted next close from the most recent usable bar.
    pub async fn predict(&self, symbol: &Symbol) -> Result<f64, PredictorError> {
        let model = self.model(symbol)?;
        let history = self
            .market
            .fetch_history(symbol, self.config.predict_period)
            .await?;
        let quote = self.market.fetch_live_quote(symbol).await;
        log_quote_fallback(symbol, &quote);

        let row = history
            .bars
            .iter()
            .rev()
            .find_map(|bar| FeatureRow::from_bar(bar, &quote))
            .ok_or_else(|| PredictorError::NoRecentData {
                symbol: symbol.clone(),
            })?;

        let prediction = model.predict_one(&row.to_vec())?;
        tracing::debug!(%symbol, prediction, "predicted next close");
        Ok(prediction)
    }

    /// Forecast range and breakout level alongside the fixed commentary.
    pub async fn insights(&self, symbol: &Symbol) -> Result<Insights, PredictorError> {
        let model = self.model(symbol)?;

        let forecast = match self
            .market
            .fetch_history(symbol, self.config.forecast_period)
            .await
        {
            Ok(series) => {
                let rows: Vec<Vec<f64>> = bar_only_rows(&series.bars)
                    .iter()
                    .map(FeatureRow::to_vec)
                    .collect();
                Forecast::from_rows(&model, &rows, FORECAST_HORIZON)
            }
            Err(error) => {
                tracing::debug!(%symbol, %error, "forecast window unavailable");
                Forecast::Unavailable
            }
        };

        let breakout_level = match self
            .market
            .fetch_history(symbol, self.config.breakout_period)
            .await
        {
            Ok(series) => breakout_threshold(series.recent_closes(self.config.breakout_window)),
            Err(error) => {
                tracing::debug!(%symbol, %error, "breakout window unavailable");
                0.0
            }
        };

        Ok(Insights::new(forecast, FORECAST_HORIZON, breakout_level))
    }

    fn model(&self, symbol: &Symbol) -> Result<Arc<RandomForestRegressor>, PredictorError> {
        self.read_models()
            .get(symbol)
            .cloned()
            .ok_or_else(|| PredictorError::NotReady {
                symbol: symbol.clone(),
            })
    }

    fn install(&self, symbol: &Symbol, model: Arc<RandomForestRegressor>) {
        self.models
            .write()
            .expect("model registry lock is not poisoned")
            .insert(symbol.clone(), model);
    }

    fn read_models(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<Symbol, Arc<RandomForestRegressor>>> {
        self.models
            .read()
            .expect("model registry lock is not poisoned")
    }
}

/// A model already installed for `symbol` stays in place.
fn fit_failed(symbol: &Symbol, reason: String) -> TrainOutcome {
    tracing::warn!(%symbol, %reason, "failed to train model");
    TrainOutcome::FitFailed { reason }
}

fn log_quote_fallback(symbol: &Symbol, quote: &LiveQuote) {
    if let LiveQuote::Unavailable { reason } = quote {
        tracing::debug!(%symbol, %reason, "live quote unavailable, using bar values");
    }
}
