use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Period, Symbol, UtcDateTime, ValidationError};

/// One trading session's OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// A bar is usable for features when every field, volume included, is present and finite.
    pub fn is_complete(&self) -> bool {
        self.volume.is_some()
            && [self.open, self.high, self.low, self.close]
                .iter()
                .all(|value| value.is_finite())
    }
}

/// Chronological daily bars for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: Symbol,
    pub period: Period,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, sorting by timestamp and keeping the last bar seen for each calendar date.
    pub fn new(symbol: Symbol, period: Period, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.ts);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.ts.date() == bar.ts.date() => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol,
            period,
            bars: deduped,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Closing prices of the most recent `n` sessions, oldest first.
    pub fn recent_closes(&self, n: usize) -> impl Iterator<Item = f64> + '_ {
        let start = self.bars.len().saturating_sub(n);
        self.bars[start..].iter().map(|bar| bar.close)
    }
}

/// Live point-in-time quote for the current session.
///
/// Every field is optional: providers omit fields or send a "no data" marker
/// for illiquid symbols and outside market hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub traded_volume: Option<f64>,
    pub last_price: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
}

impl QuoteSnapshot {
    pub fn is_empty(&self) -> bool {
        [
            self.day_high,
            self.day_low,
            self.traded_volume,
            self.last_price,
            self.high_52w,
            self.low_52w,
        ]
        .iter()
        .all(Option::is_none)
    }
}

/// Why a live quote could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    Transport,
    Status,
    MalformedPayload,
    UnknownSymbol,
    Timeout,
    CircuitOpen,
}

impl UnavailableReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::MalformedPayload => "malformed_payload",
            Self::UnknownSymbol => "unknown_symbol",
            Self::Timeout => "timeout",
            Self::CircuitOpen => "circuit_open",
        }
    }
}

impl Display for UnavailableReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a live quote request.
///
/// Unavailability is an expected state, not an error: callers substitute
/// bar values field by field instead of aborting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveQuote {
    Available(QuoteSnapshot),
    Unavailable { reason: UnavailableReason },
}

impl LiveQuote {
    pub const fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    pub fn snapshot(&self) -> Option<&QuoteSnapshot> {
        match self {
            Self::Available(snapshot) => Some(snapshot),
            Self::Unavailable { .. } => None,
        }
    }

    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
