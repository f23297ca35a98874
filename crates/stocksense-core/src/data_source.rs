//! Provider contracts and request types.
//!
//! Two independent traits split the two upstreams: [`HistorySource`] for
//! daily bars, whose failures propagate, and [`LiveQuoteSource`] for session
//! snapshots, whose failures are folded into [`LiveQuote::Unavailable`].
//!
//! ```rust,ignore
//! use stocksense_core::{HistoryRequest, HistorySource, Period, Symbol, YahooHistoryAdapter};
//!
//! async fn closes(adapter: &YahooHistoryAdapter) -> Result<Vec<f64>, SourceError> {
//!     let request = HistoryRequest::new(Symbol::parse("RELIANCE")?, Period::OneMonth);
//!     let series = adapter.history(request).await?;
//!     Ok(series.bars.iter().map(|bar| bar.close).collect())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{BarSeries, LiveQuote, Period, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    InvalidRequest,
    Internal,
}

/// Structured history fetch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<crate::ValidationError> for SourceError {
    fn from(error: crate::ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub period: Period,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, period: Period) -> Self {
        Self { symbol, period }
    }
}

/// Historical daily bar provider.
///
/// Returns whatever the provider yields, including an empty series for
/// delisted or illiquid symbols. No retries are attempted.
pub trait HistorySource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>>;
}

/// Live session quote provider.
///
/// Never fails: every transport, status or payload problem becomes
/// [`LiveQuote::Unavailable`].
pub trait LiveQuoteSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn live_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = LiveQuote> + Send + 'a>>;
}
