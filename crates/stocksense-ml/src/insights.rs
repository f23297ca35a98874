//! Insight payload: computed forecast range and breakout level, plus fixed
//! placeholder commentary.

use serde::Serialize;

use crate::forest::RandomForestRegressor;

/// Fixed values shown until real detection exists. Nothing here is computed.
pub mod placeholders {
    use super::{Direction, EventItem, NewsItem};

    pub const BREAKOUT_CONFIRMATION: &str = "No breakout detected";
    pub const NEAR_BREAKOUT: &str = "Not near breakout";
    pub const CHART_PATTERN: &str = "No clear pattern detected";
    pub const DIRECTION: Direction = Direction::Upside;

    pub fn news() -> Vec<NewsItem> {
        vec![
            NewsItem::new(
                "Company announces dividend",
                "The company declared a dividend for shareholders for Q2.",
            ),
            NewsItem::new(
                "Stock hits 52-week high",
                "The stock price reached a new 52-week high amid strong earnings.",
            ),
        ]
    }

    pub fn events() -> Vec<EventItem> {
        vec![
            EventItem::new("Earnings Call", "2025-08-10"),
            EventItem::new("AGM", "2025-09-01"),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Upside,
    Downside,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upside => "Upside",
            Self::Downside => "Downside",
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Upside => "↑",
            Self::Downside => "↓",
        }
    }
}

/// Predicted close range over the last few sessions' rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Forecast {
    Range { min: f64, max: f64 },
    Unavailable,
}

impl Forecast {
    /// Range over model outputs for the last `horizon` rows.
    ///
    /// Fewer rows than `horizon`, or any model error, is unavailable.
    pub fn from_rows(model: &RandomForestRegressor, rows: &[Vec<f64>], horizon: usize) -> Self {
        if horizon == 0 || rows.len() < horizon {
            return Self::Unavailable;
        }
        let Ok(predictions) = model.predict(&rows[rows.len() - horizon..]) else {
            return Self::Unavailable;
        };

        let min = predictions.iter().copied().fold(f64::INFINITY, f64::min);
        let max = predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::Range { min, max }
    }

    pub fn describe(&self, horizon: usize) -> String {
        match self {
            Self::Range { min, max } => {
                format!("Price range {min:.2} to {max:.2} for next {horizon} days")
            }
            Self::Unavailable => String::from("Forecast unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
}

impl NewsItem {
    pub fn new(title: &str, summary: &str) -> Self {
        Self {
            title: title.to_owned(),
            summary: summary.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventItem {
    pub event: String,
    pub date: String,
}

impl EventItem {
    pub fn new(event: &str, date: &str) -> Self {
        Self {
            event: event.to_owned(),
            date: date.to_owned(),
        }
    }
}

/// Highest of the given closes; 0 when there are none.
pub fn breakout_threshold(closes: impl IntoIterator<Item = f64>) -> f64 {
    closes.into_iter().fold(None, |best: Option<f64>, close| {
        Some(best.map_or(close, |b| b.max(close)))
    })
    .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub breakout_confirmation: String,
    pub breakout_level: f64,
    pub breakout_prediction: String,
    pub near_breakout: String,
    pub direction: Direction,
    pub direction_symbol: String,
    pub forecast_range: Forecast,
    pub forecast: String,
    pub chart_pattern: String,
    pub news: Vec<NewsItem>,
    pub events: Vec<EventItem>,
}

impl Insights {
    pub fn new(forecast: Forecast, horizon: usize, breakout_level: f64) -> Self {
        Self {
            breakout_confirmation: placeholders::BREAKOUT_CONFIRMATION.to_owned(),
            breakout_level,
            breakout_prediction: format!(
                "Breakout will be confirmed if price closes above {breakout_level:.2}"
            ),
            near_breakout: placeholders::NEAR_BREAKOUT.to_owned(),
            direction: placeholders::DIRECTION,
            direction_symbol: placeholders::DIRECTION.arrow().to_owned(),
            forecast_range: forecast,
            forecast: forecast.describe(horizon),
            chart_pattern: placeholders::CHART_PATTERN.to_owned(),
            news: placeholders::news(),
            events: placeholders::events(),
        }
    }
}
