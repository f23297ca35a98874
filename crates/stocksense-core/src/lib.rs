//! # StockSense Core
//!
//! Domain types and market data acquisition for StockSense.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, periods, daily bars and live quotes
//! - **Provider traits** splitting history (fallible) from live quotes (typed fallback)
//! - **Adapters** for the Yahoo chart endpoint and the NSE quote endpoint
//! - **Acquisition facade** applying an explicit timeout to every call
//! - **Circuit breaker** per adapter
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`acquisition`] | [`MarketData`] facade and the snapshot fallback rule |
//! | [`adapters`] | Yahoo history and NSE live quote adapters |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`config`] | Acquisition defaults |
//! | [`data_source`] | Provider traits, requests and [`SourceError`] |
//! | [`domain`] | Domain models |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP transport seam |
//! | [`logging`] | Tracing subscriber for the binaries |
//! | [`overview`] | Price/history overview for display |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stocksense_core::{AcquisitionConfig, MarketData, Period, ReqwestHttpClient, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let market = MarketData::from_config(
//!         Arc::new(ReqwestHttpClient::new()),
//!         &AcquisitionConfig::default(),
//!     );
//!     let symbol = Symbol::parse("RELIANCE")?;
//!     let series = market.fetch_history(&symbol, Period::OneMonth).await?;
//!     println!("{} sessions", series.len());
//!     Ok(())
//! }
//! ```

pub mod acquisition;
pub mod adapters;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod overview;
pub mod source;

pub use acquisition::{MarketData, SnapshotFallback};
pub use adapters::{NseQuoteAdapter, YahooHistoryAdapter};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use config::AcquisitionConfig;
pub use data_source::{
    HistoryRequest, HistorySource, LiveQuoteSource, SourceError, SourceErrorKind,
};
pub use domain::{
    Bar, BarSeries, LiveQuote, Period, QuoteSnapshot, Symbol, UnavailableReason, UtcDateTime,
};
pub use error::ValidationError;
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use overview::{fetch_overview, StockOverview};
pub use source::ProviderId;
