//! Acquisition facade over the history and live quote providers.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{NseQuoteAdapter, YahooHistoryAdapter};
use crate::data_source::{HistoryRequest, HistorySource, LiveQuoteSource, SourceError};
use crate::http_client::HttpClient;
use crate::{AcquisitionConfig, BarSeries, LiveQuote, Period, Symbol, UnavailableReason};

/// Injected pair of providers with a facade-level timeout on every call.
///
/// Cloning shares the underlying providers.
#[derive(Clone)]
pub struct MarketData {
    history: Arc<dyn HistorySource>,
    live: Arc<dyn LiveQuoteSource>,
    timeout: Duration,
}

impl MarketData {
    pub fn new(
        history: Arc<dyn HistorySource>,
        live: Arc<dyn LiveQuoteSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            history,
            live,
            timeout,
        }
    }

    /// Yahoo history and NSE quotes sharing one transport.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &AcquisitionConfig) -> Self {
        Self::new(
            Arc::new(YahooHistoryAdapter::new(Arc::clone(&http_client), config)),
            Arc::new(NseQuoteAdapter::new(http_client, config)),
            config.request_timeout,
        )
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch_history(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<BarSeries, SourceError> {
        let request = HistoryRequest::new(symbol.clone(), period);
        match tokio::time::timeout(self.timeout, self.history.history(request)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::unavailable(format!(
                "{} history request for {symbol} timed out after {} ms",
                self.history.id(),
                self.timeout.as_millis()
            ))),
        }
    }

    /// Never fails; expiry is reported as [`UnavailableReason::Timeout`].
    pub async fn fetch_live_quote(&self, symbol: &Symbol) -> LiveQuote {
        match tokio::time::timeout(self.timeout, self.live.live_quote(symbol)).await {
            Ok(quote) => quote,
            Err(_) => {
                tracing::debug!(%symbol, provider = %self.live.id(), "live quote timed out");
                LiveQuote::unavailable(UnavailableReason::Timeout)
            }
        }
    }
}

/// Snapshot values for one feature row after the per-field fallback.
///
/// Each field independently takes the live value when present and otherwise
/// the bar's own value: day high from high, day low from low, traded volume
/// from volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotFallback {
    pub day_high: f64,
    pub day_low: f64,
    pub volume: f64,
}

impl SnapshotFallback {
    pub fn resolve(quote: &LiveQuote, bar_high: f64, bar_low: f64, bar_volume: f64) -> Self {
        let snapshot = quote.snapshot();
        Self {
            day_high: snapshot.and_then(|s| s.day_high).unwrap_or(bar_high),
            day_low: snapshot.and_then(|s| s.day_low).unwrap_or(bar_low),
            volume: snapshot.and_then(|s| s.traded_volume).unwrap_or(bar_volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::{ProviderId, QuoteSnapshot};
    use std::future::Future;
    use std::pin::Pin;

    struct HangingSource;

    impl HistorySource for HangingSource {
        fn id(&self) -> ProviderId {
            ProviderId::Yahoo
        }

        fn history<'a>(
            &'a self,
            _req: HistoryRequest,
        ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
            Box::pin(std::future::pending())
        }
    }

    impl LiveQuoteSource for HangingSource {
        fn id(&self) -> ProviderId {
            ProviderId::Nse
        }

        fn live_quote<'a>(
            &'a self,
            _symbol: &'a Symbol,
        ) -> Pin<Box<dyn Future<Output = LiveQuote> + Send + 'a>> {
            Box::pin(std::future::pending())
        }
    }

    fn hanging_market() -> MarketData {
        let source = Arc::new(HangingSource);
        MarketData::new(source.clone(), source, Duration::from_millis(20))
    }

    #[tokio::test]
    async fn history_timeout_is_unavailable_error() {
        let symbol = Symbol::parse("TCS").expect("valid symbol");
        let error = hanging_market()
            .fetch_history(&symbol, Period::OneYear)
            .await
            .expect_err("hanging provider must time out");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.message().contains("timed out"));
    }

    #[tokio::test]
    async fn live_quote_timeout_is_typed_unavailable() {
        let symbol = Symbol::parse("TCS").expect("valid symbol");
        let quote = hanging_market().fetch_live_quote(&symbol).await;
        assert_eq!(quote, LiveQuote::unavailable(UnavailableReason::Timeout));
    }

    #[test]
    fn fallback_uses_bar_values_when_quote_unavailable() {
        let quote = LiveQuote::unavailable(UnavailableReason::Transport);
        let resolved = SnapshotFallback::resolve(&quote, 10.0, 8.0, 1000.0);
        assert_eq!(
            resolved,
            SnapshotFallback {
                day_high: 10.0,
                day_low: 8.0,
                volume: 1000.0,
            }
        );
    }

    #[test]
    fn fallback_is_applied_per_field() {
        let quote = LiveQuote::Available(QuoteSnapshot {
            day_high: Some(12.5),
            day_low: None,
            traded_volume: Some(4200.0),
            ..QuoteSnapshot::default()
        });
        let resolved = SnapshotFallback::resolve(&quote, 10.0, 8.0, 1000.0);
        assert_eq!(resolved.day_high, 12.5);
        assert_eq!(resolved.day_low, 8.0);
        assert_eq!(resolved.volume, 4200.0);
    }
}
