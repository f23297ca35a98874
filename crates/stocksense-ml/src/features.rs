//! Feature rows built from daily bars plus the live snapshot.

use stocksense_core::{Bar, LiveQuote, SnapshotFallback};

/// Positional column order shared by training and inference.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "open",
    "high",
    "low",
    "volume",
    "snapshot_day_high",
    "snapshot_day_low",
    "snapshot_volume",
];

pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub snapshot_day_high: f64,
    pub snapshot_day_low: f64,
    pub snapshot_volume: f64,
}

impl FeatureRow {
    /// `None` for bars with a missing or non-finite value.
    pub fn from_bar(bar: &Bar, quote: &LiveQuote) -> Option<Self> {
        let row = Self::bar_only(bar)?;
        let snapshot = SnapshotFallback::resolve(quote, row.high, row.low, row.volume);

        Some(Self {
            snapshot_day_high: snapshot.day_high,
            snapshot_day_low: snapshot.day_low,
            snapshot_volume: snapshot.volume,
            ..row
        })
    }

    /// Row whose snapshot columns repeat the bar's own high, low and volume.
    pub fn bar_only(bar: &Bar) -> Option<Self> {
        if !bar.is_complete() {
            return None;
        }
        let volume = bar.volume? as f64;

        Some(Self {
            open: bar.open,
            high: bar.high,
            low: bar.low,
            volume,
            snapshot_day_high: bar.high,
            snapshot_day_low: bar.low,
            snapshot_volume: volume,
        })
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.open,
            self.high,
            self.low,
            self.volume,
            self.snapshot_day_high,
            self.snapshot_day_low,
            self.snapshot_volume,
        ]
    }
}

/// Bars usable as features, in series order.
pub fn usable_bars(bars: &[Bar]) -> impl Iterator<Item = &Bar> {
    bars.iter().filter(|bar| bar.is_complete())
}

/// One row per usable bar; a single quote applies to every row.
pub fn feature_rows(bars: &[Bar], quote: &LiveQuote) -> Vec<FeatureRow> {
    bars.iter()
        .filter_map(|bar| FeatureRow::from_bar(bar, quote))
        .collect()
}

/// One bar-only row per usable bar, for sessions the live snapshot does not describe.
pub fn bar_only_rows(bars: &[Bar]) -> Vec<FeatureRow> {
    bars.iter().filter_map(FeatureRow::bar_only).collect()
}
