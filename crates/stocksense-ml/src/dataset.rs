use stocksense_core::{Bar, LiveQuote, UtcDateTime};

use crate::features::{FeatureRow, FEATURE_COLUMNS};

/// Training examples: features for session `i`, label = close of session `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
    pub timestamps: Vec<UtcDateTime>,
}

impl Dataset {
    /// Pairs each usable bar with the next usable bar's close.
    ///
    /// N usable bars give N - 1 examples; fewer than two give none.
    pub fn from_bars(bars: &[Bar], quote: &LiveQuote) -> Self {
        let usable: Vec<(&Bar, FeatureRow)> = bars
            .iter()
            .filter_map(|bar| FeatureRow::from_bar(bar, quote).map(|row| (bar, row)))
            .collect();

        let mut dataset = Self {
            features: Vec::with_capacity(usable.len().saturating_sub(1)),
            labels: Vec::with_capacity(usable.len().saturating_sub(1)),
            timestamps: Vec::with_capacity(usable.len().saturating_sub(1)),
        };

        for pair in usable.windows(2) {
            let (bar, row) = pair[0];
            let (next, _) = pair[1];
            dataset.features.push(row.to_vec());
            dataset.labels.push(next.close);
            dataset.timestamps.push(bar.ts);
        }

        dataset
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        FEATURE_COLUMNS.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Root mean squared error of `predictions` against the labels.
    ///
    /// `None` when the lengths differ or the dataset is empty.
    pub fn rmse(&self, predictions: &[f64]) -> Option<f64> {
        if self.is_empty() || predictions.len() != self.labels.len() {
            return None;
        }
        let mse = predictions
            .iter()
            .zip(&self.labels)
            .map(|(prediction, label)| (prediction - label).powi(2))
            .sum::<f64>()
            / self.labels.len() as f64;
        Some(mse.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksense_core::UnavailableReason;
    use time::Duration;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = UtcDateTime::parse("2024-01-01T09:15:00Z")
            .expect("valid timestamp")
            .into_inner();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let ts = UtcDateTime::from_offset_datetime(start + Duration::days(i as i64))
                    .expect("utc timestamp");
                Bar::new(ts, *close, close + 1.0, close - 1.0, *close, Some(100 + i as u64))
                    .expect("valid bar")
            })
            .collect()
    }

    #[test]
    fn labels_are_next_close() {
        let quote = LiveQuote::unavailable(UnavailableReason::Transport);
        let closes = [100.0, 101.5, 99.0, 103.25];
        let dataset = Dataset::from_bars(&bars(&closes), &quote);

        assert_eq!(dataset.n_samples(), closes.len() - 1);
        assert_eq!(dataset.labels, closes[1..].to_vec());
        assert_eq!(dataset.features[0][0], 100.0);
        assert_eq!(dataset.timestamps.len(), dataset.n_samples());
    }

    #[test]
    fn single_bar_gives_no_examples() {
        let quote = LiveQuote::unavailable(UnavailableReason::Transport);
        assert!(Dataset::from_bars(&bars(&[100.0]), &quote).is_empty());
        assert!(Dataset::from_bars(&[], &quote).is_empty());
    }

    #[test]
    fn rmse_matches_hand_computation() {
        let quote = LiveQuote::unavailable(UnavailableReason::Transport);
        let dataset = Dataset::from_bars(&bars(&[1.0, 2.0, 3.0]), &quote);

        let rmse = dataset.rmse(&[2.0, 5.0]).expect("same length");
        assert!((rmse - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(dataset.rmse(&[1.0]), None);
    }
}
