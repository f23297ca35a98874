use serde::Serialize;

use crate::acquisition::MarketData;
use crate::data_source::SourceError;
use crate::{BarSeries, Period, QuoteSnapshot, Symbol};

/// History plus live quote for one symbol, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockOverview {
    pub symbol: Symbol,
    pub period: Period,
    pub history: BarSeries,
    /// `None` when the live quote was unavailable.
    pub live: Option<QuoteSnapshot>,
    /// Live last price, else the most recent close.
    pub current_price: Option<f64>,
}

pub async fn fetch_overview(
    market: &MarketData,
    symbol: &Symbol,
    period: Period,
) -> Result<StockOverview, SourceError> {
    let history = market.fetch_history(symbol, period).await?;
    let live = market.fetch_live_quote(symbol).await.snapshot().cloned();

    let current_price = live
        .as_ref()
        .and_then(|snapshot| snapshot.last_price)
        .or_else(|| history.last().map(|bar| bar.close));

    Ok(StockOverview {
        symbol: symbol.clone(),
        period,
        history,
        live,
        current_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::NoopHttpClient;
    use crate::AcquisitionConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn overview_prefers_live_last_price() {
        let market =
            MarketData::from_config(Arc::new(NoopHttpClient), &AcquisitionConfig::default());
        let symbol = Symbol::parse("INFY").expect("valid symbol");

        let overview = fetch_overview(&market, &symbol, Period::SevenDays)
            .await
            .expect("mock overview");

        let live_price = overview.live.as_ref().and_then(|s| s.last_price);
        assert!(live_price.is_some());
        assert_eq!(overview.current_price, live_price);
        assert_eq!(overview.history.len(), Period::SevenDays.approx_sessions());
    }
}
