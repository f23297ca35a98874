//! HTML rendering for the dashboard. All interpolated text goes through [`escape`].

use std::fmt::Write;

use stocksense_core::{BarSeries, Period, StockOverview, Symbol};
use stocksense_ml::Insights;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Unknown values fall back to light.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// One symbol's section on the dashboard.
#[derive(Debug, Clone)]
pub struct SymbolSection {
    pub symbol: Symbol,
    pub overview: Option<StockOverview>,
    pub prediction: Option<f64>,
    pub insights: Option<Insights>,
}

pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("-"), |v| format!("{v:.2}"))
}

pub fn history_table(series: &BarSeries) -> String {
    let mut html = String::from(
        "<table class=\"data\">\n<thead><tr><th>Date</th><th>Open</th><th>High</th>\
         <th>Low</th><th>Close</th><th>Volume</th></tr></thead>\n<tbody>\n",
    );
    for bar in &series.bars {
        let volume = bar.volume.map_or_else(|| String::from("-"), |v| v.to_string());
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            bar.ts.format_date(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            volume
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn overview_fields(html: &mut String, overview: &StockOverview) {
    html.push_str("<dl class=\"overview\">\n");
    let mut field = |label: &str, value: String| {
        let _ = writeln!(html, "<dt>{}</dt><dd>{}</dd>", escape(label), escape(&value));
    };
    field("Current Price", price(overview.current_price));
    field(
        "Previous Close",
        price(
            overview
                .history
                .bars
                .iter()
                .rev()
                .nth(1)
                .map(|bar| bar.close),
        ),
    );
    if let Some(live) = &overview.live {
        field("Last Traded Price", price(live.last_price));
        field("Day High", price(live.day_high));
        field("Day Low", price(live.day_low));
        field("52 Week High", price(live.high_52w));
        field("52 Week Low", price(live.low_52w));
        field("Volume", price(live.traded_volume));
    } else {
        field("Live Quote", String::from("unavailable"));
    }
    html.push_str("</dl>\n");
}

fn insights_block(html: &mut String, insights: &Insights) {
    html.push_str("<ul class=\"insights\">\n");
    let rows = [
        ("Breakout Confirmation", insights.breakout_confirmation.clone()),
        ("Breakout Prediction", insights.breakout_prediction.clone()),
        ("Near Breakout", insights.near_breakout.clone()),
        (
            "Direction",
            format!(
                "{} {}",
                insights.direction.as_str(),
                insights.direction_symbol
            ),
        ),
        ("Forecast", insights.forecast.clone()),
        ("Chart Pattern", insights.chart_pattern.clone()),
    ];
    for (label, value) in rows {
        let _ = writeln!(html, "<li><b>{}:</b> {}</li>", label, escape(&value));
    }
    html.push_str("</ul>\n<h4>Latest News</h4>\n<ul class=\"news\">\n");
    for news in &insights.news {
        let _ = writeln!(
            html,
            "<li><b>{}</b>: {}</li>",
            escape(&news.title),
            escape(&news.summary)
        );
    }
    html.push_str("</ul>\n<h4>Upcoming Events</h4>\n<ul class=\"events\">\n");
    for event in &insights.events {
        let _ = writeln!(
            html,
            "<li>{} on {}</li>",
            escape(&event.event),
            escape(&event.date)
        );
    }
    html.push_str("</ul>\n");
}

fn symbol_section(html: &mut String, section: &SymbolSection) {
    let symbol = escape(section.symbol.as_str());
    let _ = writeln!(html, "<section class=\"stock\" id=\"{symbol}\">\n<h2>{symbol}</h2>");

    match &section.overview {
        Some(overview) => {
            overview_fields(html, overview);
            html.push_str(&history_table(&overview.history));
        }
        None => html.push_str("<p class=\"unavailable\">stock data unavailable</p>\n"),
    }

    match section.prediction {
        Some(prediction) => {
            let _ = writeln!(
                html,
                "<p class=\"prediction\">AI Predicted Next Close: {prediction:.2}</p>"
            );
        }
        None => html.push_str("<p class=\"prediction\">prediction unavailable</p>\n"),
    }

    match &section.insights {
        Some(insights) => insights_block(html, insights),
        None => html.push_str("<p class=\"unavailable\">insights unavailable</p>\n"),
    }
    html.push_str("</section>\n");
}

fn period_options(html: &mut String, selected: Period) {
    for period in Period::ALL {
        let marker = if period == selected { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{p}\"{marker}>{p}</option>",
            p = period.as_str()
        );
    }
}

pub fn dashboard(
    symbols: &[Symbol],
    period: Period,
    theme: Theme,
    sections: &[SymbolSection],
) -> String {
    let joined = symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(",");

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>StockSense</title>\n</head>\n<body class=\"theme-{theme}\">\n\
         <h1>StockSense</h1>\n<form method=\"post\" action=\"/\">\n\
         <input name=\"symbol\" value=\"{symbols}\">\n<select name=\"period\">\n",
        theme = theme.as_str(),
        symbols = escape(&joined),
    );
    period_options(&mut html, period);
    let _ = write!(
        html,
        "</select>\n<input type=\"hidden\" name=\"theme\" value=\"{}\">\n\
         <button type=\"submit\">Analyze</button>\n</form>\n",
        theme.as_str()
    );

    for section in sections {
        symbol_section(&mut html, section);
    }
    html.push_str("</body>\n</html>\n");
    html
}
