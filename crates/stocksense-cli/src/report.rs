use serde::Serialize;
use stocksense_core::{fetch_overview, MarketData, Symbol};
use stocksense_ml::{Insights, Predictor, PredictorConfig, TrainOutcome};

/// Everything printed for one symbol. Failed steps are `None`; their cause is logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub current_price: Option<f64>,
    pub training: Option<TrainOutcome>,
    pub predicted_close: Option<f64>,
    pub insights: Option<Insights>,
}

/// Train, predict, gather insights and the current price for one symbol.
///
/// Each symbol gets its own predictor over the shared market data.
pub async fn build_report(
    market: MarketData,
    config: PredictorConfig,
    symbol: Symbol,
) -> SymbolReport {
    let predictor = Predictor::new(market, config);
    tracing::info!(%symbol, "fetching and training model");

    let training = match predictor.train(&symbol).await {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            tracing::warn!(%symbol, %error, "training failed");
            None
        }
    };

    let predicted_close = match predictor.predict(&symbol).await {
        Ok(prediction) => {
            tracing::debug!(%symbol, prediction, "prediction ready");
            Some(prediction)
        }
        Err(error) => {
            tracing::warn!(%symbol, %error, "prediction unavailable");
            None
        }
    };

    let insights = match predictor.insights(&symbol).await {
        Ok(insights) => Some(insights),
        Err(error) => {
            tracing::warn!(%symbol, %error, "insights unavailable");
            None
        }
    };

    let overview_period = predictor.config().predict_period;
    let current_price = match fetch_overview(predictor.market(), &symbol, overview_period).await {
        Ok(overview) => overview.current_price,
        Err(error) => {
            tracing::warn!(%symbol, %error, "stock overview unavailable");
            None
        }
    };

    SymbolReport {
        symbol,
        current_price,
        training,
        predicted_close,
        insights,
    }
}
