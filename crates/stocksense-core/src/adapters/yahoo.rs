use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::Duration;

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{HistoryRequest, HistorySource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{AcquisitionConfig, Bar, BarSeries, ProviderId, Symbol, UtcDateTime};

use super::symbol_seed;

/// Daily bar adapter for the Yahoo Finance chart endpoint.
///
/// Symbols are sent as `{SYMBOL}{suffix}`, e.g. `RELIANCE.NS`.
#[derive(Clone)]
pub struct YahooHistoryAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    exchange_suffix: String,
    timeout: std::time::Duration,
}

impl Default for YahooHistoryAdapter {
    fn default() -> Self {
        Self::new(Arc::new(NoopHttpClient), &AcquisitionConfig::default())
    }
}

impl YahooHistoryAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &AcquisitionConfig) -> Self {
        Self {
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::for_provider(ProviderId::Yahoo)),
            base_url: config.yahoo_base_url.trim_end_matches('/').to_owned(),
            exchange_suffix: config.exchange_suffix.clone(),
            timeout: config.request_timeout,
        }
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// Provider spelling of a symbol, e.g. `TCS` becomes `TCS.NS`.
    pub fn provider_symbol(&self, symbol: &Symbol) -> String {
        format!("{}{}", symbol.as_str(), self.exchange_suffix)
    }

    pub fn chart_url(&self, req: &HistoryRequest) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url,
            urlencoding::encode(&self.provider_symbol(&req.symbol)),
            req.period.as_str()
        )
    }

    /// Executes a GET behind the circuit breaker and returns the body of a 2xx response.
    async fn fetch_body(&self, url: &str) -> Result<String, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(
                "yahoo circuit breaker is open; skipping upstream call",
            ));
        }

        let request = HttpRequest::get(url)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout(self.timeout);

        let response = self.http_client.execute(request).await.map_err(|error| {
            self.circuit_breaker.record_failure();
            SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
        })?;

        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        self.circuit_breaker.record_success();
        Ok(response.body)
    }

    async fn fetch_real_history(&self, req: &HistoryRequest) -> Result<BarSeries, SourceError> {
        let body = self.fetch_body(&self.chart_url(req)).await?;
        let bars = parse_chart_response(&body)?;
        Ok(BarSeries::new(req.symbol.clone(), req.period, bars))
    }

    async fn fetch_fake_history(&self, req: &HistoryRequest) -> Result<BarSeries, SourceError> {
        self.fetch_body(&self.chart_url(req)).await?;

        let count = req.period.approx_sessions();
        let now = UtcDateTime::now().into_inner();
        let seed = symbol_seed(&req.symbol);
        let mut bars = Vec::with_capacity(count);

        for index in 0..count {
            let offset = Duration::days(count.saturating_sub(index + 1) as i64);
            let ts = UtcDateTime::from_offset_datetime(now - offset)?;
            let base = 90.0 + ((seed + index as u64) % 350) as f64 / 10.0;
            let bar = Bar::new(
                ts,
                base,
                base + 1.20,
                base - 0.80,
                base + 0.30,
                Some(20_000 + (index as u64) * 25),
            )?;
            bars.push(bar);
        }

        Ok(BarSeries::new(req.symbol.clone(), req.period, bars))
    }
}

impl HistorySource for YahooHistoryAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.http_client.is_mock() {
                self.fetch_fake_history(&req).await
            } else {
                self.fetch_real_history(&req).await
            }
        })
    }
}

/// Parse a chart payload into bars.
///
/// Sessions with any missing OHLC value, or values failing bar validation,
/// are skipped. A result without timestamps is an empty history.
pub fn parse_chart_response(body: &str) -> Result<Vec<Bar>, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response
        .chart
        .error
        .as_ref()
        .filter(|error| !error.is_null())
    {
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {error}"
        )));
    }

    let Some(result) = chart_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Ok(Vec::new());
    };

    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts_value) in timestamps.iter().enumerate() {
        let Ok(ts) = UtcDateTime::from_unix_timestamp(ts_value) else {
            continue;
        };

        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) {
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok());

            if let Ok(bar) = Bar::new(ts, *open, *high, *low, *close, volume) {
                bars.push(bar);
            }
        }
    }

    Ok(bars)
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::Period;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn responding(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704166200, 1704252600, 1704339000, 1704425400],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 101.0, null,  103.0],
                        "high":   [102.0, 103.0, 104.0, 105.0],
                        "low":    [ 99.0, 100.0, 101.0, 102.0],
                        "close":  [101.0, 102.0, 103.0, 104.0],
                        "volume": [1000,  1100,  1200,  null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn request(symbol: &str, period: Period) -> HistoryRequest {
        HistoryRequest::new(Symbol::parse(symbol).expect("valid symbol"), period)
    }

    #[tokio::test]
    async fn history_uses_suffixed_symbol_and_period() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))));
        let adapter = YahooHistoryAdapter::new(client.clone(), &AcquisitionConfig::default());

        let series = adapter
            .history(request("reliance", Period::OneYear))
            .await
            .expect("history should parse");

        assert_eq!(
            client.recorded_urls(),
            vec![String::from(
                "https://query1.finance.yahoo.com/v8/finance/chart/RELIANCE.NS?range=1y&interval=1d"
            )]
        );
        assert_eq!(series.symbol.as_str(), "RELIANCE");
        assert_eq!(series.len(), 3, "row with missing open is skipped");
        assert_eq!(series.bars[2].volume, None);
    }

    #[test]
    fn empty_result_is_empty_history() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart_response(body).expect("parses").is_empty());
    }

    #[test]
    fn api_error_is_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let error = parse_chart_response(body).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.message().contains("delisted"));
    }

    #[test]
    fn malformed_payload_is_internal_error() {
        let error = parse_chart_response("<html>").expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }

    #[tokio::test]
    async fn non_success_status_propagates() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(
            HttpResponse::with_status(503, ""),
        )));
        let adapter = YahooHistoryAdapter::new(client, &AcquisitionConfig::default());

        let error = adapter
            .history(request("TCS", Period::SevenDays))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.message().contains("503"));
    }

    #[tokio::test]
    async fn circuit_breaker_blocks_after_repeated_transport_failures() {
        let client = Arc::new(RecordingHttpClient::responding(Err(HttpError::new(
            "connection reset",
        ))));
        let adapter = YahooHistoryAdapter::new(client.clone(), &AcquisitionConfig::default());

        for _ in 0..3 {
            adapter
                .history(request("INFY", Period::SevenDays))
                .await
                .expect_err("call should fail");
        }

        let error = adapter
            .history(request("INFY", Period::SevenDays))
            .await
            .expect_err("breaker should block request");
        assert!(error.message().contains("circuit breaker is open"));
        assert_eq!(client.recorded_urls().len(), 3);
    }

    #[tokio::test]
    async fn mock_client_serves_deterministic_history() {
        let adapter = YahooHistoryAdapter::default();

        let first = adapter
            .history(request("TCS", Period::OneMonth))
            .await
            .expect("fake history");
        let second = adapter
            .history(request("TCS", Period::OneMonth))
            .await
            .expect("fake history");

        assert_eq!(first.len(), Period::OneMonth.approx_sessions());
        let closes = |series: &BarSeries| series.bars.iter().map(|b| b.close).collect::<Vec<_>>();
        assert_eq!(closes(&first), closes(&second));
    }
}
