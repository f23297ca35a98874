use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use stocksense_core::{fetch_overview, Period, Symbol};
use stocksense_ml::{Insights, RetrainStatus};

use crate::error::WebError;
use crate::render::{self, SymbolSection, Theme};
use crate::AppState;

pub const DEFAULT_SYMBOL: &str = "RELIANCE";
pub const DEFAULT_PERIOD: Period = Period::SevenDays;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardForm {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub theme: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightsQuery {
    pub symbols: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolInsights {
    pub prediction: Option<f64>,
    pub insights: Option<Insights>,
}

#[derive(Debug, Serialize)]
pub struct RetrainResponse {
    pub symbol: Symbol,
    pub status: RetrainStatus,
}

fn parse_symbols(raw: &str) -> Result<Vec<Symbol>, WebError> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    let symbols = Symbol::parse_list(&compact)?;
    if symbols.is_empty() {
        return Err(WebError::MissingParameter("symbol"));
    }
    Ok(symbols)
}

fn parse_period(raw: Option<&str>) -> Result<Period, WebError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.parse()?),
        None => Ok(DEFAULT_PERIOD),
    }
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    render_dashboard(&state, DashboardForm::default()).await
}

pub async fn index_submit(
    State(state): State<AppState>,
    Form(form): Form<DashboardForm>,
) -> Result<Html<String>, WebError> {
    render_dashboard(&state, form).await
}

async fn render_dashboard(state: &AppState, form: DashboardForm) -> Result<Html<String>, WebError> {
    let symbols = parse_symbols(form.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL))?;
    let period = parse_period(form.period.as_deref())?;
    let theme = Theme::parse(form.theme.as_deref());
    tracing::info!(symbols = ?symbols, %period, "dashboard requested");

    let mut sections = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        let overview = match fetch_overview(state.predictor.market(), symbol, period).await {
            Ok(overview) => Some(overview),
            Err(error) => {
                tracing::warn!(%symbol, %error, "stock data unavailable");
                None
            }
        };
        let (prediction, insights) = predict_with_insights(state, symbol).await;
        sections.push(SymbolSection {
            symbol: symbol.clone(),
            overview,
            prediction,
            insights,
        });
    }

    Ok(Html(render::dashboard(&symbols, period, theme, &sections)))
}

/// Train (or load), then predict and gather insights; failures become `None`.
async fn predict_with_insights(
    state: &AppState,
    symbol: &Symbol,
) -> (Option<f64>, Option<Insights>) {
    if let Err(error) = state.predictor.train(symbol).await {
        tracing::warn!(%symbol, %error, "training failed");
    }

    let prediction = state
        .predictor
        .predict(symbol)
        .await
        .map_err(|error| tracing::warn!(%symbol, %error, "prediction unavailable"))
        .ok();
    let insights = state
        .predictor
        .insights(symbol)
        .await
        .map_err(|error| tracing::warn!(%symbol, %error, "insights unavailable"))
        .ok();
    (prediction, insights)
}

pub async fn history_table(
    State(state): State<AppState>,
    Query(query): Query<DashboardForm>,
) -> Result<Html<String>, WebError> {
    let raw = query
        .symbol
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or(WebError::MissingParameter("symbol"))?;
    let symbol = Symbol::parse(raw)?;
    let period = parse_period(query.period.as_deref())?;
    tracing::info!(%symbol, %period, "history table requested");

    let series = state.predictor.market().fetch_history(&symbol, period).await?;
    Ok(Html(render::history_table(&series)))
}

pub async fn insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<BTreeMap<String, SymbolInsights>>, WebError> {
    let raw = query
        .symbols
        .as_deref()
        .ok_or(WebError::MissingParameter("symbols"))?;
    let symbols = parse_symbols(raw)?;

    let mut payload = BTreeMap::new();
    for symbol in symbols {
        let (prediction, insights) = predict_with_insights(&state, &symbol).await;
        payload.insert(
            symbol.as_str().to_owned(),
            SymbolInsights {
                prediction,
                insights,
            },
        );
    }
    Ok(Json(payload))
}

pub async fn retrain(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<RetrainResponse>), WebError> {
    let symbol = Symbol::parse(&raw)?;
    let status = state.retrain.schedule(symbol.clone());
    Ok((StatusCode::ACCEPTED, Json(RetrainResponse { symbol, status })))
}
