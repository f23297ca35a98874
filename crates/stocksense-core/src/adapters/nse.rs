use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::LiveQuoteSource;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{AcquisitionConfig, LiveQuote, ProviderId, QuoteSnapshot, Symbol, UnavailableReason};

use super::symbol_seed;

const KNOWN_FIELDS: [&str; 6] = [
    "dayHigh",
    "dayLow",
    "quantityTraded",
    "lastPrice",
    "high52",
    "low52",
];

/// Live session quote adapter for the NSE equity quote endpoint.
#[derive(Clone)]
pub struct NseQuoteAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    timeout: std::time::Duration,
}

impl Default for NseQuoteAdapter {
    fn default() -> Self {
        Self::new(Arc::new(NoopHttpClient), &AcquisitionConfig::default())
    }
}

impl NseQuoteAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &AcquisitionConfig) -> Self {
        Self {
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::for_provider(ProviderId::Nse)),
            base_url: config.nse_base_url.trim_end_matches('/').to_owned(),
            timeout: config.request_timeout,
        }
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn quote_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/api/quote-equity?symbol={}",
            self.base_url,
            urlencoding::encode(&symbol.to_lowercase())
        )
    }

    async fn fetch_real_quote(&self, symbol: &Symbol) -> LiveQuote {
        if !self.circuit_breaker.allow_request() {
            return LiveQuote::unavailable(UnavailableReason::CircuitOpen);
        }

        let request = HttpRequest::get(self.quote_url(symbol))
            .with_header("accept", "application/json")
            .with_header("referer", "https://www.nseindia.com/")
            .with_timeout(self.timeout);

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                self.circuit_breaker.record_failure();
                tracing::debug!(%symbol, error = %error, "nse transport failure");
                return LiveQuote::unavailable(if error.timed_out() {
                    UnavailableReason::Timeout
                } else {
                    UnavailableReason::Transport
                });
            }
        };

        if response.status == 404 {
            self.circuit_breaker.record_success();
            return LiveQuote::unavailable(UnavailableReason::UnknownSymbol);
        }
        if !response.is_success() {
            self.circuit_breaker.record_failure();
            tracing::debug!(%symbol, status = response.status, "nse returned non-success status");
            return LiveQuote::unavailable(UnavailableReason::Status);
        }

        match parse_quote_payload(&response.body) {
            Ok(quote) => {
                self.circuit_breaker.record_success();
                quote
            }
            Err(reason) => {
                self.circuit_breaker.record_failure();
                LiveQuote::unavailable(reason)
            }
        }
    }

    fn fake_quote(symbol: &Symbol) -> LiveQuote {
        let seed = symbol_seed(symbol);
        let base = 90.0 + (seed % 350) as f64 / 10.0;
        LiveQuote::Available(QuoteSnapshot {
            day_high: Some(base + 1.5),
            day_low: Some(base - 1.0),
            traded_volume: Some(25_000.0 + (seed % 1_000) as f64),
            last_price: Some(base + 0.4),
            high_52w: Some(base * 1.25),
            low_52w: Some(base * 0.8),
        })
    }
}

impl LiveQuoteSource for NseQuoteAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Nse
    }

    fn live_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = LiveQuote> + Send + 'a>> {
        Box::pin(async move {
            if self.http_client.is_mock() {
                Self::fake_quote(symbol)
            } else {
                self.fetch_real_quote(symbol).await
            }
        })
    }
}

/// Parse an NSE quote body.
///
/// A body that is not a JSON object is malformed. An object carrying none of
/// the quote fields is treated as an unknown symbol.
pub fn parse_quote_payload(body: &str) -> Result<LiveQuote, UnavailableReason> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| UnavailableReason::MalformedPayload)?;
    let Value::Object(fields) = value else {
        return Err(UnavailableReason::MalformedPayload);
    };

    if !KNOWN_FIELDS.iter().any(|name| fields.contains_key(*name)) {
        return Err(UnavailableReason::UnknownSymbol);
    }

    Ok(LiveQuote::Available(QuoteSnapshot {
        day_high: numeric_field(&fields, "dayHigh"),
        day_low: numeric_field(&fields, "dayLow"),
        traded_volume: numeric_field(&fields, "quantityTraded"),
        last_price: numeric_field(&fields, "lastPrice"),
        high_52w: numeric_field(&fields, "high52"),
        low_52w: numeric_field(&fields, "low52"),
    }))
}

fn numeric_field(fields: &Map<String, Value>, name: &str) -> Option<f64> {
    fields.get(name).and_then(parse_numeric)
}

/// Numbers pass through; strings like `"2,345.60"` are ungrouped first.
/// `"-"`, blanks, null and anything non-finite are absent.
fn parse_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let cleaned: String = text.trim().chars().filter(|ch| *ch != ',').collect();
            if cleaned.is_empty() || cleaned == "-" {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}
