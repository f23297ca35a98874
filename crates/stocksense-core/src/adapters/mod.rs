//! Provider adapters.
//!
//! - [`YahooHistoryAdapter`]: daily bars from the Yahoo chart endpoint
//! - [`NseQuoteAdapter`]: live session quotes from NSE
//!
//! Both switch to deterministic offline data when the injected transport
//! reports [`HttpClient::is_mock`](crate::HttpClient::is_mock).

mod nse;
mod yahoo;

pub use nse::{parse_quote_payload, NseQuoteAdapter};
pub use yahoo::{parse_chart_response, YahooHistoryAdapter};

use crate::Symbol;

/// Stable per-symbol seed for offline data.
pub(crate) fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}
