//! # Domain Models
//!
//! Canonical domain types for stocksense market data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercase ticker |
//! | [`Period`] | History lookback window (`7d`, `1mo`, `1y`, ...) |
//! | [`Bar`] | One session's OHLCV record |
//! | [`BarSeries`] | Chronological, date-unique bars for a symbol |
//! | [`QuoteSnapshot`] | Live session quote with optional fields |
//! | [`LiveQuote`] | Snapshot or a typed "unavailable" outcome |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates invariants; invalid bars never enter a series.

mod models;
mod period;
mod symbol;
mod timestamp;

pub use models::{Bar, BarSeries, LiveQuote, QuoteSnapshot, UnavailableReason};
pub use period::Period;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
